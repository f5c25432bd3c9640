//! Bootstrap seeder tests
//!
//! Sequential and concurrent runs must converge to one system user, one row
//! per default permission and role permission sets equal to the defaults.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use gatehouse_auth::app::{App, AppBuilder};
use gatehouse_auth::bootstrap::{self, SeedOutcome};
use gatehouse_auth::defaults::{DEFAULT_ROLES, SYSTEM_ROLE, SYSTEM_USER_EMAIL};
use gatehouse_auth::settings::SettingName;
use gatehouse_store_adapter_sqlite::StoreAdapterSqlite;
use gatehouse_types::error::Error;
use gatehouse_types::store_adapter::StoreAdapter;

use common::*;

/// Number of log entries written by one full seeding run
const ENTRIES_PER_RUN: usize = 1 + 3 + 2 + 3 + 1;

#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
	system_users: u64,
	permissions: Vec<Box<str>>,
	role_permissions: Vec<(&'static str, Vec<Box<str>>)>,
}

async fn snapshot(app: &App) -> Snapshot {
	let mut role_permissions = Vec::new();
	for role in DEFAULT_ROLES {
		role_permissions.push((role.name, app.store.list_role_permissions(role.name).await.unwrap()));
	}
	Snapshot {
		system_users: app.store.count_users_with_role(SYSTEM_ROLE).await.unwrap(),
		permissions: app.store.list_permissions().await.unwrap(),
		role_permissions,
	}
}

fn assert_matches_defaults(snap: &Snapshot) {
	assert_eq!(snap.system_users, 1);
	let perms: Vec<&str> = snap.permissions.iter().map(AsRef::as_ref).collect();
	assert_eq!(perms, vec!["users:read", "users:write"]);
	for (role, (name, perms)) in DEFAULT_ROLES.iter().zip(&snap.role_permissions) {
		assert_eq!(role.name, *name);
		let perms: Vec<&str> = perms.iter().map(AsRef::as_ref).collect();
		assert_eq!(perms, role.permissions, "role {}", name);
	}
}

#[tokio::test]
async fn test_seed_twice_in_sequence() {
	let (app, _tmp) = create_test_app().await;

	assert_eq!(bootstrap::seed_default_data(&app).await.unwrap(), SeedOutcome::Seeded);
	let first = snapshot(&app).await;
	assert_matches_defaults(&first);
	assert_eq!(app.mutation_log.list(100).await.unwrap().len(), ENTRIES_PER_RUN);

	assert_eq!(bootstrap::seed_default_data(&app).await.unwrap(), SeedOutcome::AlreadySeeded);
	assert_eq!(snapshot(&app).await, first);
	assert_eq!(app.mutation_log.list(100).await.unwrap().len(), ENTRIES_PER_RUN);
}

#[tokio::test]
async fn test_seeding_flag_is_boolean() {
	let (app, _tmp) = create_test_app().await;

	let res = app.settings.get::<bool>(SettingName::SeedingComplete).await;
	assert!(matches!(res, Err(Error::SettingNotFound(_))));

	// Default row present, seeding not done
	app.settings.create_if_missing(SettingName::SeedingComplete, "false").await.unwrap();
	assert!(!app.settings.get::<bool>(SettingName::SeedingComplete).await.unwrap());

	bootstrap::run(&app).await;
	assert!(app.settings.get::<bool>(SettingName::SeedingComplete).await.unwrap());
}

#[tokio::test]
async fn test_system_user_attribution() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();

	let system = app.store.find_user_by_email(SYSTEM_USER_EMAIL).await.unwrap().unwrap();
	assert_eq!(system.name.as_ref(), "System");
	assert_eq!(system.roles.len(), 1);
	assert_eq!(system.roles[0].name.as_ref(), SYSTEM_ROLE);
	assert!(system.roles[0].permissions.is_empty());

	let entries = app.mutation_log.list(100).await.unwrap();
	assert!(entries.iter().all(|e| e.actor == system.id));
	assert!(entries.iter().all(|e| e.entity.as_ref() == "Database Seeder"));

	// Oldest entry is the system user upsert, newest attaches its role
	assert_eq!(entries.last().unwrap().mutation.as_ref(), "Upserted system user");
	assert_eq!(entries[0].mutation.as_ref(), "Attached system role to system user");
	assert!(entries.iter().any(|e| e.mutation.as_ref()
		== "Upserted role: admin with permissions: users:read, users:write"));
	assert!(entries
		.iter()
		.any(|e| e.mutation.as_ref() == "Upserted setting: user:signInTries with value: 5"));

	assert_eq!(app.mutation_log.resolve_system_actor_id().await.unwrap(), system.id);
}

#[tokio::test]
async fn test_reseed_converges_drifted_roles() {
	let (app, _tmp) = create_test_app().await;
	bootstrap::seed_default_data(&app).await.unwrap();
	let seeded = snapshot(&app).await;

	// Operator drift: extra permission on `user`, nothing left on `admin`
	app.store.upsert_permission("users:delete").await.unwrap();
	app.store.replace_role_permissions("user", &["users:read", "users:delete"]).await.unwrap();
	app.store.replace_role_permissions("admin", &[]).await.unwrap();
	app.store.update_setting("user:signInTries", "9").await.unwrap();

	// A later retry redoes the sequence
	app.settings.set(SettingName::SeedingComplete, &false).await.unwrap();
	assert_eq!(bootstrap::seed_default_data(&app).await.unwrap(), SeedOutcome::Seeded);

	let reseeded = snapshot(&app).await;
	assert_eq!(reseeded.system_users, 1);
	assert_eq!(reseeded.role_permissions, seeded.role_permissions);
	// Operator adjusted setting survives
	assert_eq!(app.settings.get::<i64>(SettingName::SignInTries).await.unwrap(), 9);
}

#[tokio::test]
async fn test_failed_step_leaves_flag_unset_and_retry_heals() {
	let (app, store, _tmp) = create_failing_test_app().await;

	store.fail_upsert_role.store(true, Ordering::SeqCst);
	let res = bootstrap::seed_default_data(&app).await;
	assert!(matches!(res, Err(Error::DbError)));
	assert!(!app.settings.get::<bool>(SettingName::SeedingComplete).await.unwrap());

	// Stopped at the first role, so no role exists and the system role is unattached
	for role in DEFAULT_ROLES {
		assert!(app.store.list_role_permissions(role.name).await.is_err());
	}
	assert_eq!(app.store.count_users_with_role(SYSTEM_ROLE).await.unwrap(), 0);

	store.fail_upsert_role.store(false, Ordering::SeqCst);
	assert_eq!(bootstrap::seed_default_data(&app).await.unwrap(), SeedOutcome::Seeded);
	assert!(app.settings.get::<bool>(SettingName::SeedingComplete).await.unwrap());
	assert_matches_defaults(&snapshot(&app).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_seeding_converges() {
	let (app, _tmp) = create_test_app().await;

	let (a, b) = tokio::join!(
		bootstrap::seed_default_data(&app),
		bootstrap::seed_default_data(&app)
	);
	assert!(a.is_ok() && b.is_ok(), "{:?} {:?}", a, b);
	assert!(a.unwrap() == SeedOutcome::Seeded || b.unwrap() == SeedOutcome::Seeded);

	assert_matches_defaults(&snapshot(&app).await);
	assert!(app.settings.get::<bool>(SettingName::SeedingComplete).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_seeding_from_separate_apps() {
	let (app, tmp) = create_test_app().await;
	let other = {
		// Second handle on the same database, as a second process would have
		let store = StoreAdapterSqlite::new(tmp.path()).await.unwrap();
		AppBuilder::new()
			.bcrypt_cost(TEST_BCRYPT_COST)
			.session_secret(TEST_SECRET)
			.store(Arc::new(store))
			.build()
			.unwrap()
	};

	let (a, b) = tokio::join!(
		tokio::spawn({
			let app = app.clone();
			async move { bootstrap::seed_default_data(&app).await }
		}),
		tokio::spawn({
			let other = other.clone();
			async move { bootstrap::seed_default_data(&other).await }
		})
	);
	assert!(a.unwrap().is_ok());
	assert!(b.unwrap().is_ok());

	assert_matches_defaults(&snapshot(&app).await);
	assert_eq!(snapshot(&app).await, snapshot(&other).await);
}

// vim: ts=4
