use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

use crate::utils::{disable_rls_sql, enable_rls_sql, owner_policy, RlsCommand, RlsPolicy};

const TABLE: &str = "todos";

fn policies() -> Vec<RlsPolicy> {
    [
        RlsCommand::Select,
        RlsCommand::Insert,
        RlsCommand::Update,
        RlsCommand::Delete,
    ]
    .into_iter()
    .map(|command| owner_policy(TABLE, "owner_id", command))
    .collect()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        manager
            .get_connection()
            .execute(Statement::from_string(
                backend,
                enable_rls_sql(TABLE, Some("public")),
            ))
            .await?;

        for policy in policies() {
            manager
                .get_connection()
                .execute(policy.create_statement(backend))
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        for policy in policies() {
            manager
                .get_connection()
                .execute(policy.drop_statement(backend))
                .await?;
        }
        manager
            .get_connection()
            .execute(Statement::from_string(
                backend,
                disable_rls_sql(TABLE, Some("public")),
            ))
            .await?;
        Ok(())
    }
}
