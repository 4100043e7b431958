//! Harness error types.

use thiserror::Error;

/// Harness errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend unreachable or rejected the connection parameters.
    #[error("{backend}: connection error: {message}")]
    Connection {
        backend: &'static str,
        message: String,
    },

    /// Table or keyspace creation failed.
    #[error("{backend}: schema setup error: {message}")]
    SchemaSetup {
        backend: &'static str,
        message: String,
    },

    /// SQLite operation error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// PostgreSQL operation error.
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Redis operation error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a connection error for `backend` from any displayable cause.
    pub fn connection(backend: &'static str, cause: impl std::fmt::Display) -> Self {
        Error::Connection {
            backend,
            message: cause.to_string(),
        }
    }

    /// Build a schema setup error for `backend` from any displayable cause.
    pub fn schema_setup(backend: &'static str, cause: impl std::fmt::Display) -> Self {
        Error::SchemaSetup {
            backend,
            message: cause.to_string(),
        }
    }
}

/// Result alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
