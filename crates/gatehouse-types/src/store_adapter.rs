//! Adapter that persists users, roles, permissions, settings and the mutation log.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// A role assigned to a user, with the names of the permissions it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
	pub name: Box<str>,
	pub permissions: Box<[Box<str>]>,
}

/// A user row together with its role assignments
#[derive(Debug, Clone)]
pub struct UserRecord {
	pub id: UserId,
	pub name: Box<str>,
	pub email: Box<str>,
	pub password_hash: Box<str>,
	pub roles: Vec<RoleGrant>,
}

/// Role row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
	pub role_id: i64,
	pub name: Box<str>,
}

/// Fields used when a user row is created
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub name: &'a str,
	pub email: &'a str,
	pub password_hash: &'a str,
}

/// A mutation log entry to be appended
#[derive(Debug)]
pub struct NewMutationLog<'a> {
	pub actor: UserId,
	pub entity: &'a str,
	pub mutation: &'a str,
}

/// A persisted mutation log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationLogEntry {
	pub log_id: i64,
	pub actor: UserId,
	pub entity: Box<str>,
	pub mutation: Box<str>,
	pub created_at: Timestamp,
}

/// A `Gatehouse` store adapter
///
/// Every operation is atomic at the single-row or single-relation level, and
/// `create_first_user_with_role` is atomic as a whole. Other multi-step sequences
/// built on top of it are not transactional, so callers must keep them idempotent. Create-style operations named `upsert_*` are single conditional writes
/// that never fail when the row already exists.
#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	// Users
	/// Reads a user with its roles and their permissions by exact email match
	async fn find_user_by_email(&self, email: &str) -> GhResult<Option<UserRecord>>;

	/// Creates the user keyed by `email` if absent, returns the id of the existing or new row.
	/// An existing row is left untouched.
	async fn upsert_user(&self, email: &str, data: CreateUserData<'_>) -> GhResult<UserId>;

	/// Creates a new user, fails with `AlreadyExists` if the email is taken
	async fn create_user(&self, data: CreateUserData<'_>) -> GhResult<UserId>;

	/// Creates a user holding `role` in one transaction, unless some user already holds it.
	/// Returns `None` and writes nothing when the role has a holder.
	/// Fails with `AlreadyExists` if the email is taken and `NotFound` if the role does not exist.
	async fn create_first_user_with_role(
		&self,
		role: &str,
		data: CreateUserData<'_>,
	) -> GhResult<Option<UserId>>;

	/// Counts users holding the named role
	async fn count_users_with_role(&self, role: &str) -> GhResult<u64>;

	/// Returns the lowest user id holding the named role
	async fn find_user_with_role(&self, role: &str) -> GhResult<Option<UserId>>;

	/// Adds the role to the user, no-op if already attached.
	/// Fails with `NotFound` if the role does not exist.
	async fn attach_role(&self, user_id: UserId, role: &str) -> GhResult<()>;

	// Roles and permissions
	/// Creates the role if absent and returns it
	async fn upsert_role(&self, name: &str) -> GhResult<Role>;

	/// Replaces the permission set of a role with exactly `permissions`.
	/// Fails with `NotFound` if the role or any permission does not exist.
	async fn replace_role_permissions(&self, role: &str, permissions: &[&str]) -> GhResult<()>;

	/// Lists the permission names of a role, sorted
	async fn list_role_permissions(&self, role: &str) -> GhResult<Vec<Box<str>>>;

	/// Creates the permission if absent
	async fn upsert_permission(&self, name: &str) -> GhResult<()>;

	/// Lists all permission names, sorted
	async fn list_permissions(&self) -> GhResult<Vec<Box<str>>>;

	// Settings
	/// Reads the raw stored value of a setting
	async fn read_setting(&self, name: &str) -> GhResult<Option<Box<str>>>;

	/// Creates the setting with `value` if absent, returns the value now stored.
	/// An existing value is never overwritten.
	async fn create_setting(&self, name: &str, value: &str) -> GhResult<Box<str>>;

	/// Overwrites an existing setting, fails with `NotFound` if the row is absent
	async fn update_setting(&self, name: &str, value: &str) -> GhResult<()>;

	// Mutation log
	/// Appends an entry, fails with `NotFound` if the actor does not exist
	async fn insert_mutation_log(&self, entry: &NewMutationLog<'_>) -> GhResult<()>;

	/// Lists the most recent entries, newest first
	async fn list_mutation_log(&self, limit: u32) -> GhResult<Vec<MutationLogEntry>>;
}

// vim: ts=4
