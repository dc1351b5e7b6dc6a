//! Row level security statements for Supabase-hosted tables
use sea_orm::{DbBackend, Statement};

/// Statement kind a policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlsCommand {
    Select,
    Insert,
    Update,
    Delete,
}

impl RlsCommand {
    fn as_sql(self) -> &'static str {
        match self {
            RlsCommand::Select => "SELECT",
            RlsCommand::Insert => "INSERT",
            RlsCommand::Update => "UPDATE",
            RlsCommand::Delete => "DELETE",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            RlsCommand::Select => "select",
            RlsCommand::Insert => "insert",
            RlsCommand::Update => "update",
            RlsCommand::Delete => "delete",
        }
    }
}

/// Database role Supabase assigns to requests carrying a user token
const AUTHENTICATED_ROLE: &str = "authenticated";

/// Policy granted to the `authenticated` role
#[derive(Debug, Clone)]
pub struct RlsPolicy {
    pub name: String,
    pub table: String,
    pub command: RlsCommand,
    /// Row filter for existing rows; INSERT policies have none
    pub using: Option<String>,
    /// Row filter for new row values
    pub check: Option<String>,
    pub schema: Option<String>,
}

fn qualified(table: &str, schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, table),
        None => table.to_string(),
    }
}

impl RlsPolicy {
    pub fn create_policy_sql(&self) -> String {
        let using = match &self.using {
            Some(expr) => format!(" USING ({})", expr),
            None => String::new(),
        };
        let check = match &self.check {
            Some(expr) => format!(" WITH CHECK ({})", expr),
            None => String::new(),
        };

        format!(
            "CREATE POLICY \"{}\" ON {} FOR {} TO {}{}{};",
            self.name,
            qualified(&self.table, self.schema.as_deref()),
            self.command.as_sql(),
            AUTHENTICATED_ROLE,
            using,
            check
        )
    }

    pub fn drop_policy_sql(&self) -> String {
        format!(
            "DROP POLICY IF EXISTS \"{}\" ON {};",
            self.name,
            qualified(&self.table, self.schema.as_deref())
        )
    }

    pub fn create_statement(&self, backend: DbBackend) -> Statement {
        Statement::from_string(backend, self.create_policy_sql())
    }

    pub fn drop_statement(&self, backend: DbBackend) -> Statement {
        Statement::from_string(backend, self.drop_policy_sql())
    }
}

/// Policy letting a signed-in user reach only rows whose `owner_column`
/// equals their auth uid
pub fn owner_policy(table: &str, owner_column: &str, command: RlsCommand) -> RlsPolicy {
    let owns = format!("auth.uid()::text = \"{}\"", owner_column);
    let (using, check) = match command {
        RlsCommand::Insert => (None, Some(owns)),
        RlsCommand::Update => (Some(owns.clone()), Some(owns)),
        RlsCommand::Select | RlsCommand::Delete => (Some(owns), None),
    };

    RlsPolicy {
        name: format!("{}_owner_{}", table, command.slug()),
        table: table.to_string(),
        command,
        using,
        check,
        schema: Some("public".to_string()),
    }
}

pub fn enable_rls_sql(table: &str, schema: Option<&str>) -> String {
    format!(
        "ALTER TABLE {} ENABLE ROW LEVEL SECURITY;",
        qualified(table, schema)
    )
}

pub fn disable_rls_sql(table: &str, schema: Option<&str>) -> String {
    format!(
        "ALTER TABLE {} DISABLE ROW LEVEL SECURITY;",
        qualified(table, schema)
    )
}
