use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use neon_todos::model::{TaskId, TaskView};
use neon_todos::state::TodoList;
use neon_todos::view::{format_inserted_at, TodoStats};
use neon_todos::TodoClient;

#[derive(Parser, Debug)]
#[clap(name = "todos", version)]
#[clap(about = "Manage your personal task list", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Account email; falls back to TODOS_EMAIL
    #[clap(long, env = "TODOS_EMAIL")]
    email: String,

    /// Account password; falls back to TODOS_PASSWORD
    #[clap(long, env = "TODOS_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show all tasks, newest first
    List,
    /// Add a task
    Add {
        /// Task description
        #[clap(required = true)]
        text: Vec<String>,
    },
    /// Flip a task between done and not done
    Toggle { id: TaskId },
    /// Mark a task as done
    Done { id: TaskId },
    /// Mark a task as not done
    Undone { id: TaskId },
    /// Delete a task
    Delete { id: TaskId },
    /// Show total, completed and remaining counts
    Stats,
}

fn print_items(items: &[TaskView]) {
    if items.is_empty() {
        println!("No todos yet. Add your first todo to get started!");
        return;
    }
    for item in items {
        let mark = if item.is_complete { "x" } else { " " };
        let when = format_inserted_at(&item.inserted_at).unwrap_or_else(|| item.inserted_at.clone());
        println!("[{}] {:>5}  {}  ({})", mark, item.id, item.task, when);
    }
}

fn print_stats(items: &[TaskView]) {
    let stats = TodoStats::from_items(items);
    println!(
        "Total: {}  Completed: {}  Remaining: {}",
        stats.total, stats.completed, stats.remaining
    );
}

async fn current(todos: &TodoList, id: TaskId) -> anyhow::Result<TaskView> {
    let items = todos.fetch().await?;
    items
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| anyhow::anyhow!("No todo with id {}", id))
}

async fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = TodoClient::from_env().context("Failed to load configuration")?;
    client
        .auth()
        .sign_in_with_password(&cli.email, &cli.password)
        .await
        .context("Sign-in failed")?;

    let todos = client.todo_list();
    let items = match cli.command {
        Commands::List => todos.fetch().await?,
        Commands::Stats => {
            let items = todos.fetch().await?;
            print_stats(&items);
            return Ok(());
        }
        Commands::Add { text } => {
            let text = text.join(" ");
            let text = text.trim();
            if text.is_empty() {
                anyhow::bail!("Nothing to add");
            }
            todos.add(text).await?
        }
        Commands::Toggle { id } => {
            let item = current(&todos, id).await?;
            todos.toggle(id, !item.is_complete).await?
        }
        Commands::Done { id } => todos.toggle(id, true).await?,
        Commands::Undone { id } => todos.toggle(id, false).await?,
        Commands::Delete { id } => todos.remove(id).await?,
    };

    print_items(&items);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
