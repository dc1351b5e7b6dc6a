use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Todos {
    Table,
    Id,
    Task,
    IsComplete,
    OwnerId,
    InsertedAt,
}

const OWNER_INDEX: &str = "idx_todos_owner_inserted";

/// `todos`: serial id, non-null text, completion flag defaulting to false,
/// owner id, and a creation time defaulted by the database
pub fn create_todos_table() -> TableCreateStatement {
    Table::create()
        .table(Todos::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Todos::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Todos::Task).text().not_null())
        .col(
            ColumnDef::new(Todos::IsComplete)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Todos::OwnerId).text().not_null())
        .col(
            ColumnDef::new(Todos::InsertedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

/// Serves the owner-scoped, newest-first listing
pub fn create_owner_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(OWNER_INDEX)
        .table(Todos::Table)
        .col(Todos::OwnerId)
        .col(Todos::InsertedAt)
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_todos_table()).await?;
        manager.create_index(create_owner_index()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(OWNER_INDEX).table(Todos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sql() {
        let sql = create_todos_table().to_string(PostgresQueryBuilder);
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "todos""#));
        assert!(sql.contains(r#""id" serial"#));
        assert!(sql.contains(r#""task" text NOT NULL"#));
        assert!(sql.contains(r#""is_complete" bool NOT NULL DEFAULT FALSE"#));
        assert!(sql.contains(r#""owner_id" text NOT NULL"#));
        assert!(sql.contains(r#""inserted_at" timestamp with time zone NOT NULL DEFAULT CURRENT_TIMESTAMP"#));
    }

    #[test]
    fn index_sql() {
        let sql = create_owner_index().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#""idx_todos_owner_inserted""#));
        assert!(sql.contains(r#"ON "todos" ("owner_id", "inserted_at")"#));
    }
}
