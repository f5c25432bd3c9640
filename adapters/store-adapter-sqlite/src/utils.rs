//! Utility functions for database operations

use gatehouse::prelude::*;

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Log a database error and map it to `Error::DbError`
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::DbError
}

/// True if the error is a violation of a UNIQUE constraint
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// True if the error is a violation of a FOREIGN KEY constraint
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Convert a SQLite count to `u64`
pub(crate) fn to_count(n: i64) -> u64 {
	u64::try_from(n).unwrap_or(0)
}

// vim: ts=4
