// src/config.rs
use std::{env, fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_local(self) -> bool {
        self == Self::Local
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::Invalid(format!(
                "ENVIRONMENT must be one of local, development, staging, production (got `{other}`)"
            ))),
        }
    }
}

/// Connection settings: either a full URL or the discrete `POSTGRES_*` parts.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    url: Option<String>,
    user: String,
    password: String,
    host: String,
    port: u16,
    database: String,
    max_connections: u32,
}

impl DatabaseSettings {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            user: default_postgres_user(),
            password: String::new(),
            host: default_postgres_server(),
            port: default_postgres_port(),
            database: default_postgres_db(),
            max_connections: default_max_connections(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    project_name: String,
    environment: Environment,
    database: DatabaseSettings,
    listen_addr: String,
    allowed_origins: Vec<String>,
    constraint_messages_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_project_name() -> String {
    "crud-scaffold".into()
}

fn default_postgres_user() -> String {
    "postgres".into()
}

fn default_postgres_server() -> String {
    "localhost".into()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_db() -> String {
    "postgres".into()
}

fn default_max_connections() -> u32 {
    16
}

fn default_server_host() -> String {
    "127.0.0.1".into()
}

fn default_server_port() -> u16 {
    8080
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}

fn parse_number<T: FromStr>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid(format!("{key} must be a number (got `{raw}`)")))
        })
        .transpose()
}

impl AppConfig {
    /// Build configuration from environment variables, loading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok().filter(|value| !value.is_empty()))
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let project_name = lookup("PROJECT_NAME").unwrap_or_else(default_project_name);
        let environment = lookup("ENVIRONMENT")
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or(Environment::Production);

        let max_connections = parse_number("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"))?
            .unwrap_or_else(default_max_connections);
        let database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseSettings {
                max_connections,
                ..DatabaseSettings::from_url(url)
            },
            None => DatabaseSettings {
                url: None,
                user: lookup("POSTGRES_USER").unwrap_or_else(default_postgres_user),
                password: lookup("POSTGRES_PASSWORD")
                    .ok_or(ConfigError::Missing("POSTGRES_PASSWORD"))?,
                host: lookup("POSTGRES_SERVER").unwrap_or_else(default_postgres_server),
                port: parse_number("POSTGRES_PORT", lookup("POSTGRES_PORT"))?
                    .unwrap_or_else(default_postgres_port),
                database: lookup("POSTGRES_DB").unwrap_or_else(default_postgres_db),
                max_connections,
            },
        };

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(addr) => addr,
            None => {
                let host = lookup("SERVER_HOST").unwrap_or_else(default_server_host);
                let port = parse_number("SERVER_PORT", lookup("SERVER_PORT"))?
                    .unwrap_or_else(default_server_port);
                format!("{host}:{port}")
            }
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_allowed_origins);

        let constraint_messages_file = lookup("CONSTRAINT_MESSAGES_FILE").map(PathBuf::from);

        Ok(Self {
            project_name,
            environment,
            database,
            listen_addr,
            allowed_origins,
            constraint_messages_file,
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Allowed CORS origins; a single `*` means any origin.
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn constraint_messages_file(&self) -> Option<&PathBuf> {
        self.constraint_messages_file.as_ref()
    }
}
