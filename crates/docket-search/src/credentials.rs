//! Credential resolution for the relational store and the search index.
//!
//! Defines the [`CredentialSource`] trait and concrete implementations:
//! - **[`EnvCredentials`]** — reads `POSTGRES_*` / `OPENSEARCH_*` environment
//!   variables; the default for local development.
//! - **[`FileCredentials`]** — reads JSON secret documents from configured
//!   paths, in the field shape managed secret stores emit.
//!
//! # Source Selection
//!
//! Use [`create_credential_source`] to instantiate the appropriate source
//! based on the configuration. Resolution happens once at startup; the
//! resolved credentials are handed to the pool and client constructors, and
//! no global connection state is kept.
//!
//! ```rust,no_run
//! # use docket_search::config::Config;
//! # use docket_search::credentials::create_credential_source;
//! let config: Config = toml::from_str("").unwrap();
//! let source = create_credential_source(&config).unwrap();
//! let postgres = source.postgres().unwrap(); // reads POSTGRES_* variables
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::{Config, CredentialsConfig};

/// Connection parameters for the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostgresCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db: String,
}

/// Connection parameters for the search index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenSearchCredentials {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_opensearch_username")]
    pub username: String,
    pub password: String,
}

fn default_opensearch_username() -> String {
    "admin".to_string()
}

/// Trait for credential sources.
///
/// Both methods resolve eagerly: a missing variable or unreadable secret
/// file is reported when the credentials are requested, not when the
/// connection later fails.
pub trait CredentialSource: Send + Sync + std::fmt::Debug {
    /// Resolve relational store credentials.
    fn postgres(&self) -> Result<PostgresCredentials>;
    /// Resolve search index credentials.
    fn opensearch(&self) -> Result<OpenSearchCredentials>;
}

/// Instantiate the credential source named by `credentials.source`.
pub fn create_credential_source(config: &Config) -> Result<Box<dyn CredentialSource>> {
    match config.credentials.source.as_str() {
        "env" => Ok(Box::new(EnvCredentials)),
        "file" => Ok(Box::new(FileCredentials::new(&config.credentials)?)),
        other => bail!("Unknown credentials source: {}", other),
    }
}

// ============ Environment Source ============

/// Credential source backed by process environment variables.
///
/// Reads `POSTGRES_USER`, `POSTGRES_PASSWORD`, `POSTGRES_HOST`,
/// `POSTGRES_PORT` (default 5432), and `POSTGRES_DB` for the relational
/// store; `OPENSEARCH_HOST`, `OPENSEARCH_PORT` (default 9200),
/// `OPENSEARCH_USER` (default `admin`), and
/// `OPENSEARCH_INITIAL_ADMIN_PASSWORD` for the index.
#[derive(Debug)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn postgres(&self) -> Result<PostgresCredentials> {
        Ok(PostgresCredentials {
            username: require_env("POSTGRES_USER")?,
            password: require_env("POSTGRES_PASSWORD")?,
            host: require_env("POSTGRES_HOST")?,
            port: env_port("POSTGRES_PORT", 5432)?,
            db: require_env("POSTGRES_DB")?,
        })
    }

    fn opensearch(&self) -> Result<OpenSearchCredentials> {
        Ok(OpenSearchCredentials {
            host: require_env("OPENSEARCH_HOST")?,
            port: env_port("OPENSEARCH_PORT", 9200)?,
            username: std::env::var("OPENSEARCH_USER").unwrap_or_else(|_| "admin".to_string()),
            password: require_env("OPENSEARCH_INITIAL_ADMIN_PASSWORD")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{} not set", name))
}

fn env_port(name: &str, default: u16) -> Result<u16> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} is not a valid port: '{}'", name, value)),
        Err(_) => Ok(default),
    }
}

// ============ File Source ============

/// Credential source backed by JSON secret documents on disk.
///
/// Expects `{"username", "password", "host", "port", "db"}` at the
/// postgres path and `{"host", "port", "username"?, "password"}` at the
/// opensearch path. Extra fields (such as `engine`) are ignored.
#[derive(Debug)]
pub struct FileCredentials {
    postgres_path: PathBuf,
    opensearch_path: PathBuf,
}

impl FileCredentials {
    pub fn new(config: &CredentialsConfig) -> Result<Self> {
        let postgres_path = config.postgres_secret_path.clone().ok_or_else(|| {
            anyhow::anyhow!("credentials.postgres_secret_path required for file source")
        })?;
        let opensearch_path = config.opensearch_secret_path.clone().ok_or_else(|| {
            anyhow::anyhow!("credentials.opensearch_secret_path required for file source")
        })?;

        Ok(Self {
            postgres_path,
            opensearch_path,
        })
    }
}

impl CredentialSource for FileCredentials {
    fn postgres(&self) -> Result<PostgresCredentials> {
        read_secret(&self.postgres_path)
    }

    fn opensearch(&self) -> Result<OpenSearchCredentials> {
        read_secret(&self.opensearch_path)
    }
}

fn read_secret<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read secret file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse secret file: {}", path.display()))
}
