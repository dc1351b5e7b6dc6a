//! Schema for the task table
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_todos_table;
mod m20250101_000002_todos_owner_policies;

pub mod utils;

pub use m20250101_000001_create_todos_table::{create_owner_index, create_todos_table, Todos};
pub use utils::{disable_rls_sql, enable_rls_sql, owner_policy, RlsCommand, RlsPolicy};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_todos_table::Migration),
            Box::new(m20250101_000002_todos_owner_policies::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "m20250101_000001_create_todos_table",
                "m20250101_000002_todos_owner_policies",
            ]
        );
    }
}
