//! Shared helpers for the auth integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

use gatehouse_auth::app::{App, AppBuilder};
use gatehouse_store_adapter_sqlite::StoreAdapterSqlite;
use gatehouse_types::prelude::*;
use gatehouse_types::store_adapter::*;

pub const TEST_BCRYPT_COST: u32 = 4;
pub const TEST_SECRET: &str = "test-session-secret";

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.with_test_writer()
		.try_init();
}

/// Build an app on a fresh temporary database, letting the caller adjust the builder
pub async fn create_test_app_with(configure: impl FnOnce(&mut AppBuilder)) -> (App, TempDir) {
	setup_test_logging();
	let tmp_dir = TempDir::new().expect("Failed to create temp directory");
	let store = StoreAdapterSqlite::new(tmp_dir.path()).await.expect("Failed to open store");

	let mut builder = AppBuilder::new();
	builder.bcrypt_cost(TEST_BCRYPT_COST).session_secret(TEST_SECRET).store(Arc::new(store));
	configure(&mut builder);
	let app = builder.build().expect("Failed to build app");

	(app, tmp_dir)
}

pub async fn create_test_app() -> (App, TempDir) {
	create_test_app_with(|_| {}).await
}

/// Store wrapper that fails chosen operations with `DbError` while armed
#[derive(Debug)]
pub struct FailingStore {
	inner: StoreAdapterSqlite,
	pub fail_upsert_role: AtomicBool,
	pub fail_create_first_user: AtomicBool,
}

impl FailingStore {
	fn check(flag: &AtomicBool) -> GhResult<()> {
		if flag.load(Ordering::SeqCst) { Err(Error::DbError) } else { Ok(()) }
	}
}

#[async_trait]
impl StoreAdapter for FailingStore {
	async fn find_user_by_email(&self, email: &str) -> GhResult<Option<UserRecord>> {
		self.inner.find_user_by_email(email).await
	}

	async fn upsert_user(&self, email: &str, data: CreateUserData<'_>) -> GhResult<UserId> {
		self.inner.upsert_user(email, data).await
	}

	async fn create_user(&self, data: CreateUserData<'_>) -> GhResult<UserId> {
		self.inner.create_user(data).await
	}

	async fn create_first_user_with_role(
		&self,
		role: &str,
		data: CreateUserData<'_>,
	) -> GhResult<Option<UserId>> {
		Self::check(&self.fail_create_first_user)?;
		self.inner.create_first_user_with_role(role, data).await
	}

	async fn count_users_with_role(&self, role: &str) -> GhResult<u64> {
		self.inner.count_users_with_role(role).await
	}

	async fn find_user_with_role(&self, role: &str) -> GhResult<Option<UserId>> {
		self.inner.find_user_with_role(role).await
	}

	async fn attach_role(&self, user_id: UserId, role: &str) -> GhResult<()> {
		self.inner.attach_role(user_id, role).await
	}

	async fn upsert_role(&self, name: &str) -> GhResult<Role> {
		Self::check(&self.fail_upsert_role)?;
		self.inner.upsert_role(name).await
	}

	async fn replace_role_permissions(&self, role: &str, permissions: &[&str]) -> GhResult<()> {
		self.inner.replace_role_permissions(role, permissions).await
	}

	async fn list_role_permissions(&self, role: &str) -> GhResult<Vec<Box<str>>> {
		self.inner.list_role_permissions(role).await
	}

	async fn upsert_permission(&self, name: &str) -> GhResult<()> {
		self.inner.upsert_permission(name).await
	}

	async fn list_permissions(&self) -> GhResult<Vec<Box<str>>> {
		self.inner.list_permissions().await
	}

	async fn read_setting(&self, name: &str) -> GhResult<Option<Box<str>>> {
		self.inner.read_setting(name).await
	}

	async fn create_setting(&self, name: &str, value: &str) -> GhResult<Box<str>> {
		self.inner.create_setting(name, value).await
	}

	async fn update_setting(&self, name: &str, value: &str) -> GhResult<()> {
		self.inner.update_setting(name, value).await
	}

	async fn insert_mutation_log(&self, entry: &NewMutationLog<'_>) -> GhResult<()> {
		self.inner.insert_mutation_log(entry).await
	}

	async fn list_mutation_log(&self, limit: u32) -> GhResult<Vec<MutationLogEntry>> {
		self.inner.list_mutation_log(limit).await
	}
}

/// Build an app whose store can be told to fail
pub async fn create_failing_test_app() -> (App, Arc<FailingStore>, TempDir) {
	setup_test_logging();
	let tmp_dir = TempDir::new().expect("Failed to create temp directory");
	let inner = StoreAdapterSqlite::new(tmp_dir.path()).await.expect("Failed to open store");
	let store = Arc::new(FailingStore {
		inner,
		fail_upsert_role: AtomicBool::new(false),
		fail_create_first_user: AtomicBool::new(false),
	});

	let app = AppBuilder::new()
		.bcrypt_cost(TEST_BCRYPT_COST)
		.session_secret(TEST_SECRET)
		.store(store.clone())
		.build()
		.expect("Failed to build app");

	(app, store, tmp_dir)
}

// vim: ts=4
