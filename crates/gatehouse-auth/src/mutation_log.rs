//! Append-only audit trail of state changing operations
//!
//! Automated mutations are attributed to the system actor, the user holding
//! the `system` role. Its id is resolved lazily and kept in a `SystemActorCache`
//! owned by the service instance.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::defaults::SYSTEM_ROLE;
use crate::prelude::*;
use gatehouse_types::store_adapter::{MutationLogEntry, NewMutationLog, StoreAdapter};

/// Closed set of audit categories
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationCategory {
	DatabaseSeeder,
	AdminSetup,
	AuthModule,
}

impl MutationCategory {
	pub fn label(self) -> &'static str {
		match self {
			MutationCategory::DatabaseSeeder => "Database Seeder",
			MutationCategory::AdminSetup => "Admin Setup",
			MutationCategory::AuthModule => "Auth Module",
		}
	}
}

impl std::fmt::Display for MutationCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}

/// Cached id of the system actor
///
/// Racing resolutions store the same value, so the lock only guards the slot.
#[derive(Debug, Default)]
pub struct SystemActorCache {
	id: RwLock<Option<UserId>>,
}

impl SystemActorCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// A cache pre-populated with `id`
	pub fn with_id(id: UserId) -> Self {
		Self { id: RwLock::new(Some(id)) }
	}

	pub fn get(&self) -> Option<UserId> {
		*self.id.read()
	}

	fn set(&self, id: UserId) {
		*self.id.write() = Some(id);
	}

	pub fn invalidate(&self) {
		*self.id.write() = None;
	}
}

#[derive(Debug)]
pub struct MutationLog {
	store: Arc<dyn StoreAdapter>,
	system_actor: SystemActorCache,
}

impl MutationLog {
	pub fn new(store: Arc<dyn StoreAdapter>, system_actor: SystemActorCache) -> Self {
		Self { store, system_actor }
	}

	/// Append one entry attributed to `actor`
	pub async fn append(
		&self,
		actor: UserId,
		category: MutationCategory,
		description: &str,
	) -> GhResult<()> {
		let entry = NewMutationLog { actor, entity: category.label(), mutation: description };
		match self.store.insert_mutation_log(&entry).await {
			Ok(()) => {
				debug!(actor = %actor, "[{}] {}", category, description);
				Ok(())
			}
			Err(Error::NotFound) => Err(Error::ActorNotFound(actor)),
			Err(err) => Err(err),
		}
	}

	/// Id of the user holding the `system` role
	pub async fn resolve_system_actor_id(&self) -> GhResult<UserId> {
		if let Some(id) = self.system_actor.get() {
			return Ok(id);
		}

		let id = self
			.store
			.find_user_with_role(SYSTEM_ROLE)
			.await?
			.ok_or(Error::SystemActorMissing)?;
		debug!(user_id = %id, "System actor resolved");
		self.system_actor.set(id);
		Ok(id)
	}

	/// Append one entry attributed to the system actor.
	/// A stale cached id is dropped so the next call resolves it again.
	pub async fn append_as_system(
		&self,
		category: MutationCategory,
		description: &str,
	) -> GhResult<()> {
		let actor = self.resolve_system_actor_id().await?;
		let res = self.append(actor, category, description).await;
		if let Err(Error::ActorNotFound(_)) = res {
			warn!(user_id = %actor, "Cached system actor no longer exists");
			self.system_actor.invalidate();
		}
		res
	}

	pub fn invalidate_system_actor(&self) {
		self.system_actor.invalidate();
	}

	/// Most recent entries, newest first
	pub async fn list(&self, limit: u32) -> GhResult<Vec<MutationLogEntry>> {
		self.store.list_mutation_log(limit).await
	}
}


// vim: ts=4
