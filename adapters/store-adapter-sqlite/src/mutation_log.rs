//! Append-only mutation log

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use gatehouse::{prelude::*, store_adapter::*};

/// Append an entry
///
/// The existence check and the insert are one statement, so an entry can never
/// reference a missing user.
pub(crate) async fn insert(db: &SqlitePool, entry: &NewMutationLog<'_>) -> GhResult<()> {
	let res = sqlx::query(
		"INSERT INTO mutation_log (user_id, entity, mutation)
		SELECT ?1, ?2, ?3 WHERE EXISTS (SELECT 1 FROM users WHERE user_id = ?1)",
	)
	.bind(entry.actor.0)
	.bind(entry.entity)
	.bind(entry.mutation)
	.execute(db)
	.await
	.map_err(db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

/// List the latest entries
pub(crate) async fn list(db: &SqlitePool, limit: u32) -> GhResult<Vec<MutationLogEntry>> {
	let rows = sqlx::query(
		"SELECT log_id, user_id, entity, mutation, created_at FROM mutation_log
		ORDER BY log_id DESC LIMIT ?1",
	)
	.bind(limit)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	rows.iter()
		.map(|row| {
			Ok(MutationLogEntry {
				log_id: row.try_get("log_id")?,
				actor: UserId(row.try_get("user_id")?),
				entity: row.try_get("entity")?,
				mutation: row.try_get("mutation")?,
				created_at: Timestamp(row.try_get("created_at")?),
			})
		})
		.collect::<Result<Vec<_>, sqlx::Error>>()
		.map_err(db_err)
}

// vim: ts=4
