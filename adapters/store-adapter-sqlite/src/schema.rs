//! Database schema initialization and migrations

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Get the current database version from vars table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

/// Set the database version in vars table
async fn set_db_version(
	tx: &mut Transaction<'_, Sqlite>,
	version: i64,
) -> Result<(), sqlx::Error> {
	sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
		.bind(version.to_string())
		.execute(&mut **tx)
		.await?;
	Ok(())
}

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Initialize the database schema and run migrations
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Create vars table first (needed for version tracking)
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	// Schema creation - safe to run every time (uses IF NOT EXISTS)

	// Users
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
			user_id integer NOT NULL,
			email text NOT NULL,
			name text NOT NULL,
			password text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(user_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email)")
		.execute(&mut *tx)
		.await?;

	// Roles
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS roles (
			role_id integer NOT NULL,
			name text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(role_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_roles_name ON roles (name)")
		.execute(&mut *tx)
		.await?;

	// Permissions
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS permissions (
			perm_id integer NOT NULL,
			name text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(perm_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_permissions_name ON permissions (name)")
		.execute(&mut *tx)
		.await?;

	// User <-> role
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS user_roles (
			user_id integer NOT NULL REFERENCES users(user_id),
			role_id integer NOT NULL REFERENCES roles(role_id),
			PRIMARY KEY(user_id, role_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_roles_role_id ON user_roles (role_id)")
		.execute(&mut *tx)
		.await?;

	// Role <-> permission
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS role_permissions (
			role_id integer NOT NULL REFERENCES roles(role_id),
			perm_id integer NOT NULL REFERENCES permissions(perm_id),
			PRIMARY KEY(role_id, perm_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Settings
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
			name text NOT NULL,
			value text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(name)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Mutation log
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS mutation_log (
			log_id integer NOT NULL,
			user_id integer NOT NULL REFERENCES users(user_id),
			entity text NOT NULL,
			mutation text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(log_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_mutation_log_user_id ON mutation_log (user_id)")
		.execute(&mut *tx)
		.await?;

	// Triggers for automatic updated_at on INSERT
	sqlx::query(
		"CREATE TRIGGER IF NOT EXISTS vars_insert_at AFTER INSERT ON vars FOR EACH ROW \
			BEGIN UPDATE vars SET updated_at = unixepoch() WHERE key = NEW.key; END",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE TRIGGER IF NOT EXISTS users_updated_at AFTER UPDATE OF name, email, password ON users FOR EACH ROW \
			BEGIN UPDATE users SET updated_at = unixepoch() WHERE user_id = NEW.user_id; END",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE TRIGGER IF NOT EXISTS settings_updated_at AFTER UPDATE OF value ON settings FOR EACH ROW \
			BEGIN UPDATE settings SET updated_at = unixepoch() WHERE name = NEW.name; END",
	)
	.execute(&mut *tx)
	.await?;

	// The mutation log is append-only
	sqlx::query(
		"CREATE TRIGGER IF NOT EXISTS mutation_log_no_update BEFORE UPDATE ON mutation_log \
			BEGIN SELECT RAISE(ABORT, 'mutation_log is append-only'); END",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE TRIGGER IF NOT EXISTS mutation_log_no_delete BEFORE DELETE ON mutation_log \
			BEGIN SELECT RAISE(ABORT, 'mutation_log is append-only'); END",
	)
	.execute(&mut *tx)
	.await?;

	if version < CURRENT_DB_VERSION {
		set_db_version(&mut tx, CURRENT_DB_VERSION).await?;
	}

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
