//! Error type for database operations.

use thiserror::Error;

/// Errors raised by [`Database`](crate::Database).
#[derive(Debug, Error)]
pub enum DbError {
    /// The SQLite driver reported an error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A table or column name is not a plain identifier.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// `IfExists::Fail` was requested and the table exists.
    #[error("table '{0}' already exists")]
    TableExists(String),

    /// There were no rows to stage for import.
    #[error("no rows to stage into '{0}'")]
    NoRows(String),

    /// The rows to insert have no columns at all.
    #[error("no columns to insert into '{0}'")]
    NoColumns(String),
}

/// Result type alias for database operations.
pub type DbResult<T> = std::result::Result<T, DbError>;
