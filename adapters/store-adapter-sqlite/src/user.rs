//! User rows and role assignments

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use gatehouse::{prelude::*, store_adapter::*};

/// Read a user with roles and permissions
pub(crate) async fn find_by_email(db: &SqlitePool, email: &str) -> GhResult<Option<UserRecord>> {
	let res = sqlx::query("SELECT user_id, name, email, password FROM users WHERE email = ?1")
		.bind(email)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;

	let Some(row) = res else {
		return Ok(None);
	};
	let id = UserId(row.try_get("user_id").map_err(db_err)?);
	let name: Box<str> = row.try_get("name").map_err(db_err)?;
	let email: Box<str> = row.try_get("email").map_err(db_err)?;
	let password_hash: Box<str> = row.try_get("password").map_err(db_err)?;

	let grant_rows = sqlx::query(
		"SELECT r.name AS role, p.name AS perm FROM user_roles ur
		JOIN roles r ON r.role_id = ur.role_id
		LEFT JOIN role_permissions rp ON rp.role_id = r.role_id
		LEFT JOIN permissions p ON p.perm_id = rp.perm_id
		WHERE ur.user_id = ?1
		ORDER BY r.role_id, p.name",
	)
	.bind(id.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	let mut roles: Vec<(Box<str>, Vec<Box<str>>)> = Vec::new();
	for row in grant_rows {
		let role: Box<str> = row.try_get("role").map_err(db_err)?;
		let perm: Option<Box<str>> = row.try_get("perm").map_err(db_err)?;
		match roles.last_mut() {
			Some((name, perms)) if *name == role => perms.extend(perm),
			_ => roles.push((role, perm.into_iter().collect())),
		}
	}

	Ok(Some(UserRecord {
		id,
		name,
		email,
		password_hash,
		roles: roles
			.into_iter()
			.map(|(name, perms)| RoleGrant { name, permissions: perms.into_boxed_slice() })
			.collect(),
	}))
}

/// Create the user if absent, return its id
pub(crate) async fn upsert(
	db: &SqlitePool,
	email: &str,
	data: &CreateUserData<'_>,
) -> GhResult<UserId> {
	sqlx::query(
		"INSERT INTO users (email, name, password) VALUES (?1, ?2, ?3)
		ON CONFLICT(email) DO NOTHING",
	)
	.bind(email)
	.bind(data.name)
	.bind(data.password_hash)
	.execute(db)
	.await
	.map_err(db_err)?;

	let user_id: i64 = sqlx::query_scalar("SELECT user_id FROM users WHERE email = ?1")
		.bind(email)
		.fetch_one(db)
		.await
		.map_err(db_err)?;
	Ok(UserId(user_id))
}

/// Create a new user
pub(crate) async fn create(db: &SqlitePool, data: &CreateUserData<'_>) -> GhResult<UserId> {
	let res = sqlx::query("INSERT INTO users (email, name, password) VALUES (?1, ?2, ?3)")
		.bind(data.email)
		.bind(data.name)
		.bind(data.password_hash)
		.execute(db)
		.await;

	match res {
		Ok(res) => Ok(UserId(res.last_insert_rowid())),
		Err(err) if is_unique_violation(&err) => {
			Err(Error::AlreadyExists(format!("User with email {} already exists", data.email)))
		}
		Err(err) => Err(db_err(err)),
	}
}

/// Create a user as the first holder of a role
///
/// The insert runs first so the transaction holds the write lock before the
/// holder count is read; concurrent callers serialize and only one succeeds.
/// Returns `None` when the role already has a holder.
pub(crate) async fn create_with_role(
	db: &SqlitePool,
	role: &str,
	data: &CreateUserData<'_>,
) -> GhResult<Option<UserId>> {
	let mut tx = db.begin().await.map_err(db_err)?;

	let res = sqlx::query("INSERT INTO users (email, name, password) VALUES (?1, ?2, ?3)")
		.bind(data.email)
		.bind(data.name)
		.bind(data.password_hash)
		.execute(&mut *tx)
		.await;
	let user_id = match res {
		Ok(res) => res.last_insert_rowid(),
		Err(err) if is_unique_violation(&err) => {
			return Err(Error::AlreadyExists(format!(
				"User with email {} already exists",
				data.email
			)));
		}
		Err(err) => return Err(db_err(err)),
	};

	let role_id: Option<i64> = sqlx::query_scalar("SELECT role_id FROM roles WHERE name = ?1")
		.bind(role)
		.fetch_optional(&mut *tx)
		.await
		.map_err(db_err)?;
	let Some(role_id) = role_id else {
		// Dropping the transaction rolls the user insert back
		return Err(Error::NotFound);
	};

	let holders: i64 = sqlx::query_scalar("SELECT count(*) FROM user_roles WHERE role_id = ?1")
		.bind(role_id)
		.fetch_one(&mut *tx)
		.await
		.map_err(db_err)?;
	if holders > 0 {
		return Ok(None);
	}

	sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?1, ?2)")
		.bind(user_id)
		.bind(role_id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;
	Ok(Some(UserId(user_id)))
}

/// Count users holding a role
pub(crate) async fn count_with_role(db: &SqlitePool, role: &str) -> GhResult<u64> {
	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM user_roles ur
		JOIN roles r ON r.role_id = ur.role_id
		WHERE r.name = ?1",
	)
	.bind(role)
	.fetch_one(db)
	.await
	.map_err(db_err)?;
	Ok(to_count(count))
}

/// Find the first user holding a role
pub(crate) async fn find_with_role(db: &SqlitePool, role: &str) -> GhResult<Option<UserId>> {
	let user_id: Option<i64> = sqlx::query_scalar(
		"SELECT ur.user_id FROM user_roles ur
		JOIN roles r ON r.role_id = ur.role_id
		WHERE r.name = ?1
		ORDER BY ur.user_id LIMIT 1",
	)
	.bind(role)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;
	Ok(user_id.map(UserId))
}

/// Attach a role to a user
pub(crate) async fn attach_role(db: &SqlitePool, user_id: UserId, role: &str) -> GhResult<()> {
	let role_id: Option<i64> = sqlx::query_scalar("SELECT role_id FROM roles WHERE name = ?1")
		.bind(role)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;
	let role_id = role_id.ok_or(Error::NotFound)?;

	let res = sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)")
		.bind(user_id.0)
		.bind(role_id)
		.execute(db)
		.await;

	match res {
		Ok(_) => Ok(()),
		Err(err) if is_foreign_key_violation(&err) => Err(Error::NotFound),
		Err(err) => Err(db_err(err)),
	}
}

// vim: ts=4
