//! Settings storage
//!
//! Values are opaque strings; typing happens in the core.

use sqlx::SqlitePool;

use crate::utils::*;
use gatehouse::prelude::*;

/// Read a setting
pub(crate) async fn read(db: &SqlitePool, name: &str) -> GhResult<Option<Box<str>>> {
	let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE name = ?1")
		.bind(name)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;
	Ok(value.map(String::into_boxed_str))
}

/// Create a setting if absent, return the stored value
pub(crate) async fn create(db: &SqlitePool, name: &str, value: &str) -> GhResult<Box<str>> {
	sqlx::query("INSERT INTO settings (name, value) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING")
		.bind(name)
		.bind(value)
		.execute(db)
		.await
		.map_err(db_err)?;

	read(db, name).await?.ok_or(Error::NotFound)
}

/// Update an existing setting
pub(crate) async fn update(db: &SqlitePool, name: &str, value: &str) -> GhResult<()> {
	let res = sqlx::query("UPDATE settings SET value = ?2 WHERE name = ?1")
		.bind(name)
		.bind(value)
		.execute(db)
		.await
		.map_err(db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

// vim: ts=4
