//! Roles, permissions and the role -> permission relation

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use gatehouse::{prelude::*, store_adapter::Role};

/// Create a role if absent
pub(crate) async fn upsert(db: &SqlitePool, name: &str) -> GhResult<Role> {
	sqlx::query("INSERT INTO roles (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
		.bind(name)
		.execute(db)
		.await
		.map_err(db_err)?;

	let row = sqlx::query("SELECT role_id, name FROM roles WHERE name = ?1")
		.bind(name)
		.fetch_one(db)
		.await
		.map_err(db_err)?;
	Ok(Role {
		role_id: row.try_get("role_id").map_err(db_err)?,
		name: row.try_get("name").map_err(db_err)?,
	})
}

/// Replace the permission set of a role
///
/// The delete runs first so the transaction holds the write lock for the whole
/// replacement; concurrent replacements serialize instead of interleaving.
pub(crate) async fn replace_permissions(
	db: &SqlitePool,
	role: &str,
	permissions: &[&str],
) -> GhResult<()> {
	let mut tx = db.begin().await.map_err(db_err)?;

	sqlx::query(
		"DELETE FROM role_permissions WHERE role_id IN (SELECT role_id FROM roles WHERE name = ?1)",
	)
	.bind(role)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;

	let role_id: Option<i64> = sqlx::query_scalar("SELECT role_id FROM roles WHERE name = ?1")
		.bind(role)
		.fetch_optional(&mut *tx)
		.await
		.map_err(db_err)?;
	let Some(role_id) = role_id else {
		// Dropping the transaction rolls it back
		return Err(Error::NotFound);
	};

	for perm in permissions {
		let perm_id: Option<i64> =
			sqlx::query_scalar("SELECT perm_id FROM permissions WHERE name = ?1")
				.bind(*perm)
				.fetch_optional(&mut *tx)
				.await
				.map_err(db_err)?;
		let Some(perm_id) = perm_id else {
			warn!("Unknown permission {} for role {}", perm, role);
			return Err(Error::NotFound);
		};

		sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, perm_id) VALUES (?1, ?2)")
			.bind(role_id)
			.bind(perm_id)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
	}

	tx.commit().await.map_err(db_err)?;
	Ok(())
}

/// List permission names of a role
pub(crate) async fn list_permissions_of(db: &SqlitePool, role: &str) -> GhResult<Vec<Box<str>>> {
	let role_id: Option<i64> = sqlx::query_scalar("SELECT role_id FROM roles WHERE name = ?1")
		.bind(role)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;
	let role_id = role_id.ok_or(Error::NotFound)?;

	let names: Vec<String> = sqlx::query_scalar(
		"SELECT p.name FROM role_permissions rp
		JOIN permissions p ON p.perm_id = rp.perm_id
		WHERE rp.role_id = ?1
		ORDER BY p.name",
	)
	.bind(role_id)
	.fetch_all(db)
	.await
	.map_err(db_err)?;
	Ok(names.into_iter().map(String::into_boxed_str).collect())
}

/// Create a permission if absent
pub(crate) async fn upsert_permission(db: &SqlitePool, name: &str) -> GhResult<()> {
	sqlx::query("INSERT INTO permissions (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
		.bind(name)
		.execute(db)
		.await
		.map_err(db_err)?;
	Ok(())
}

/// List all permission names
pub(crate) async fn list_permissions(db: &SqlitePool) -> GhResult<Vec<Box<str>>> {
	let names: Vec<String> = sqlx::query_scalar("SELECT name FROM permissions ORDER BY name")
		.fetch_all(db)
		.await
		.map_err(db_err)?;
	Ok(names.into_iter().map(String::into_boxed_str).collect())
}

// vim: ts=4
