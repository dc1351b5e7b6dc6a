use sea_orm_migration::prelude::*;
use std::env;

use neon_todos_migration::Migrator;

async fn connect() -> Result<sea_orm::DatabaseConnection, DbErr> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL environment variable must be set".to_string()))?;
    sea_orm::Database::connect(&database_url).await
}

async fn run(command: &str) -> Result<(), DbErr> {
    match command {
        "up" => {
            println!("Running migrations up...");
            Migrator::up(&connect().await?, None).await?;
            println!("Completed migrations up.");
        }
        "down" => {
            println!("Running migrations down...");
            Migrator::down(&connect().await?, None).await?;
            println!("Completed migrations down.");
        }
        "fresh" => {
            println!("Dropping all tables and reapplying migrations...");
            Migrator::fresh(&connect().await?).await?;
            println!("Database refresh completed.");
        }
        "status" => {
            println!("Checking migration status...");
            Migrator::status(&connect().await?).await?;
        }
        _ => {
            cli::run_cli(Migrator).await;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let command = env::args().nth(1).unwrap_or_else(|| "cli".to_string());
    if let Err(err) = run(&command).await {
        eprintln!("Migration failed: {}", err);
        std::process::exit(1);
    }
}
