//! Connection bootstrap for the note database.
//!
//! `open_db` and `open_db_in_memory` hand out connections whose schema is
//! already at [`migrations::latest_version`]; nothing else in the crate opens
//! SQLite directly.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure reaching or preparing the note database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer NoteVault build.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl DbError {
    /// Whether the same call may succeed once a competing writer finishes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Sqlite(err) => matches!(
                err.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            Self::UnsupportedSchemaVersion { .. } => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "note database: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "note database schema {found} is newer than supported {supported}"
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

#[cfg(test)]
mod tests {
    use super::DbError;
    use rusqlite::ffi;

    fn sqlite_failure(code: std::os::raw::c_int) -> DbError {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(ffi::Error::new(code), None))
    }

    #[test]
    fn busy_and_locked_are_retryable() {
        assert!(sqlite_failure(ffi::SQLITE_BUSY).is_retryable());
        assert!(sqlite_failure(ffi::SQLITE_LOCKED).is_retryable());
    }

    #[test]
    fn schema_and_constraint_failures_are_not_retryable() {
        assert!(!sqlite_failure(ffi::SQLITE_CONSTRAINT).is_retryable());
        let newer = DbError::UnsupportedSchemaVersion {
            found: 9,
            supported: 2,
        };
        assert!(!newer.is_retryable());
        assert!(newer.to_string().contains("newer than supported 2"));
    }
}
