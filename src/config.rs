//! Configuration options for the todo client

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// How the client state container orders its write operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Writes and their refetches run independently; the last refetch to
    /// resolve replaces the whole list.
    #[default]
    Concurrent,
    /// Each write and its refetch hold an exclusive gate, so refetches land
    /// in the order the writes were issued.
    Serialized,
}

impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(SyncMode::Concurrent),
            "serialized" => Ok(SyncMode::Serialized),
            other => Err(Error::config(format!("unknown sync mode '{}'", other))),
        }
    }
}

/// Configuration options for the todo client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// The table holding task rows
    pub table: String,

    /// How long an error stays visible before it clears itself
    pub error_clear_delay: Duration,

    /// Write ordering for the client state container
    pub sync_mode: SyncMode,

    /// Whether sign-in keeps the session for later calls
    pub persist_session: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            table: "todos".to_string(),
            error_clear_delay: Duration::from_secs(5),
            sync_mode: SyncMode::Concurrent,
            persist_session: true,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the task table name
    pub fn with_table(mut self, value: &str) -> Self {
        self.table = value.to_string();
        self
    }

    /// Set the error auto-clear delay
    pub fn with_error_clear_delay(mut self, value: Duration) -> Self {
        self.error_clear_delay = value;
        self
    }

    /// Set the write ordering mode
    pub fn with_sync_mode(mut self, value: SyncMode) -> Self {
        self.sync_mode = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }
}

/// Connection settings for the hosted project.
/// Load these from the environment or a secure config source.
#[derive(Debug, Clone)]
pub struct TodoConfig {
    pub url: Url,
    pub anon_key: String,
    /// Secret used to verify access tokens locally (`TokenSession`)
    pub jwt_secret: Option<String>,
    pub options: ClientOptions,
}

impl TodoConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: String) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key,
            jwt_secret: None,
            options: ClientOptions::default(),
        })
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the secret used to verify access tokens
    pub fn with_jwt_secret(mut self, secret: &str) -> Self {
        self.jwt_secret = Some(secret.to_string());
        self
    }

    /// Base URL without a trailing slash, as the REST and auth paths expect
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }

    /// Attempts to create configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;

        let mut config = Self::new(&url_str, anon_key)?;
        config.jwt_secret = std::env::var("SUPABASE_JWT_SECRET").ok();

        let mut options = ClientOptions::default();
        if let Ok(table) = std::env::var("TODOS_TABLE") {
            options = options.with_table(&table);
        }
        if let Ok(secs) = std::env::var("TODOS_ERROR_CLEAR_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| Error::config(format!("invalid TODOS_ERROR_CLEAR_SECS '{}'", secs)))?;
            options = options.with_error_clear_delay(Duration::from_secs(secs));
        }
        if let Ok(mode) = std::env::var("TODOS_SYNC_MODE") {
            options = options.with_sync_mode(mode.parse()?);
        }

        Ok(config.with_options(options))
    }
}
