//! Postgres connection management.
//!
//! Provides a connection pool to the relational store. The pool is owned
//! by the caller and injected into [`crate::pg_store::PgStore`]; nothing
//! here keeps module-level connection state, so two searches never share
//! a connection by accident.
//!
//! # Connection Pool
//!
//! Uses `sqlx::PgPool` with up to `postgres.max_connections` connections
//! (default 5). Connections are reused across queries and closed when the
//! pool is dropped or explicitly closed.

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::Config;
use crate::credentials::PostgresCredentials;

/// Create a connection pool from resolved credentials.
///
/// # Errors
///
/// Returns an error if the server is unreachable or authentication fails.
pub async fn connect(config: &Config, credentials: &PostgresCredentials) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&credentials.host)
        .port(credentials.port)
        .username(&credentials.username)
        .password(&credentials.password)
        .database(&credentials.db);

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to postgres at {}:{}",
                credentials.host, credentials.port
            )
        })?;

    tracing::debug!(
        host = %credentials.host,
        port = credentials.port,
        db = %credentials.db,
        "connected to postgres"
    );

    Ok(pool)
}
