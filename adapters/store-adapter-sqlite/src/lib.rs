//! SQLite implementation of the Gatehouse store adapter.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use gatehouse::{prelude::*, store_adapter::*};

mod mutation_log;
mod role;
mod schema;
mod setting;
mod user;
mod utils;

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	/// Opens (or creates) `store.db` inside the given directory
	pub async fn new(path: impl AsRef<Path>) -> GhResult<Self> {
		let db_path = path.as_ref().join("store.db");
		tokio::fs::create_dir_all(path.as_ref()).await.map_err(|err| {
			error!("Cannot create database directory: {}", err);
			Error::DbError
		})?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&db_path)
			.create_if_missing(true)
			.foreign_keys(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.map_err(utils::db_err)?;

		schema::init_db(&db).await.map_err(utils::db_err)?;
		debug!("Store opened at {}", db_path.display());

		Ok(Self { db })
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	// Users
	async fn find_user_by_email(&self, email: &str) -> GhResult<Option<UserRecord>> {
		user::find_by_email(&self.db, email).await
	}

	async fn upsert_user(&self, email: &str, data: CreateUserData<'_>) -> GhResult<UserId> {
		user::upsert(&self.db, email, &data).await
	}

	async fn create_user(&self, data: CreateUserData<'_>) -> GhResult<UserId> {
		user::create(&self.db, &data).await
	}

	async fn create_first_user_with_role(
		&self,
		role: &str,
		data: CreateUserData<'_>,
	) -> GhResult<Option<UserId>> {
		user::create_with_role(&self.db, role, &data).await
	}

	async fn count_users_with_role(&self, role: &str) -> GhResult<u64> {
		user::count_with_role(&self.db, role).await
	}

	async fn find_user_with_role(&self, role: &str) -> GhResult<Option<UserId>> {
		user::find_with_role(&self.db, role).await
	}

	async fn attach_role(&self, user_id: UserId, role: &str) -> GhResult<()> {
		user::attach_role(&self.db, user_id, role).await
	}

	// Roles and permissions
	async fn upsert_role(&self, name: &str) -> GhResult<Role> {
		role::upsert(&self.db, name).await
	}

	async fn replace_role_permissions(&self, role: &str, permissions: &[&str]) -> GhResult<()> {
		role::replace_permissions(&self.db, role, permissions).await
	}

	async fn list_role_permissions(&self, role: &str) -> GhResult<Vec<Box<str>>> {
		role::list_permissions_of(&self.db, role).await
	}

	async fn upsert_permission(&self, name: &str) -> GhResult<()> {
		role::upsert_permission(&self.db, name).await
	}

	async fn list_permissions(&self) -> GhResult<Vec<Box<str>>> {
		role::list_permissions(&self.db).await
	}

	// Settings
	async fn read_setting(&self, name: &str) -> GhResult<Option<Box<str>>> {
		setting::read(&self.db, name).await
	}

	async fn create_setting(&self, name: &str, value: &str) -> GhResult<Box<str>> {
		setting::create(&self.db, name, value).await
	}

	async fn update_setting(&self, name: &str, value: &str) -> GhResult<()> {
		setting::update(&self.db, name, value).await
	}

	// Mutation log
	async fn insert_mutation_log(&self, entry: &NewMutationLog<'_>) -> GhResult<()> {
		mutation_log::insert(&self.db, entry).await
	}

	async fn list_mutation_log(&self, limit: u32) -> GhResult<Vec<MutationLogEntry>> {
		mutation_log::list(&self.db, limit).await
	}
}

// vim: ts=4
