//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog store.
//! - Apply schema migrations in deterministic order.
//! - Classify engine constraint failures so callers get typed errors.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write catalog data before migrations succeed.

use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Engine-level constraint failure reported by SQLite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConstraintViolation {
    /// `UNIQUE constraint failed: <table>.<column>`.
    Unique { column: String },
    /// `NOT NULL constraint failed: <table>.<column>`.
    NotNull { column: String },
    /// `CHECK constraint failed: <expr>`; carries the raw engine message.
    Check { message: String },
}

/// Extracts a constraint violation from a SQLite error, if it is one.
pub(crate) fn constraint_violation(err: &rusqlite::Error) -> Option<ConstraintViolation> {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return None;
    };
    if failure.code != rusqlite::ErrorCode::ConstraintViolation {
        return None;
    }
    let message = message.as_deref().unwrap_or_default();

    match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            Some(ConstraintViolation::Unique {
                column: failed_column(message),
            })
        }
        ffi::SQLITE_CONSTRAINT_NOTNULL => Some(ConstraintViolation::NotNull {
            column: failed_column(message),
        }),
        ffi::SQLITE_CONSTRAINT_CHECK => Some(ConstraintViolation::Check {
            message: message.to_string(),
        }),
        _ => None,
    }
}

// Engine messages look like `UNIQUE constraint failed: tipos.nombre`.
fn failed_column(message: &str) -> String {
    let target = message.rsplit(": ").next().unwrap_or(message);
    let first = target.split(',').next().unwrap_or(target).trim();
    first.rsplit('.').next().unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::failed_column;

    #[test]
    fn failed_column_strips_table_prefix() {
        assert_eq!(failed_column("UNIQUE constraint failed: tipos.nombre"), "nombre");
        assert_eq!(
            failed_column("NOT NULL constraint failed: tipos.usuario"),
            "usuario"
        );
    }

    #[test]
    fn failed_column_takes_first_of_composite_key() {
        assert_eq!(failed_column("UNIQUE constraint failed: t.a, t.b"), "a");
    }
}
