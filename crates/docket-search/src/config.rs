use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub opensearch: OpenSearchConfig,
    #[serde(default)]
    pub postgres: PostgresConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub postgres_secret_path: Option<PathBuf>,
    #[serde(default)]
    pub opensearch_secret_path: Option<PathBuf>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source: "env".to_string(),
            postgres_secret_path: None,
            opensearch_secret_path: None,
        }
    }
}

fn default_source() -> String {
    "env".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenSearchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_verify_certs")]
    pub verify_certs: bool,
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            use_tls: false,
            verify_certs: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_verify_certs() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgresConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

fn default_max_connections() -> u32 {
    5
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate credentials
    match config.credentials.source.as_str() {
        "env" => {}
        "file" => {
            if config.credentials.postgres_secret_path.is_none() {
                anyhow::bail!(
                    "credentials.postgres_secret_path must be set when source is 'file'"
                );
            }
            if config.credentials.opensearch_secret_path.is_none() {
                anyhow::bail!(
                    "credentials.opensearch_secret_path must be set when source is 'file'"
                );
            }
        }
        other => anyhow::bail!(
            "Unknown credentials source: '{}'. Must be env or file.",
            other
        ),
    }

    // Validate opensearch
    if config.opensearch.timeout_secs == 0 {
        anyhow::bail!("opensearch.timeout_secs must be > 0");
    }

    // Validate postgres
    if config.postgres.max_connections < 1 {
        anyhow::bail!("postgres.max_connections must be >= 1");
    }

    Ok(config)
}
