//! Service state and its builder

use std::sync::Arc;

use crate::mutation_log::{MutationLog, SystemActorCache};
use crate::policy::PasswordPolicy;
use crate::prelude::*;
use crate::settings::SettingsAccessor;
use gatehouse_types::store_adapter::StoreAdapter;

pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;
pub const DEFAULT_SESSION_TTL: i64 = 30 * 24 * 3600;
pub const DEFAULT_SYSTEM_PASSWORD_LENGTH: usize = 32;

#[derive(Clone)]
pub struct AuthOpts {
	/// Bcrypt work factor used when hashing new passwords
	pub bcrypt_cost: u32,
	/// HS256 key for session tokens
	pub session_secret: Box<str>,
	/// Session token lifetime in seconds
	pub session_ttl: i64,
	pub system_password_length: usize,
}

pub struct AuthState {
	pub store: Arc<dyn StoreAdapter>,
	pub opts: AuthOpts,
	pub mutation_log: MutationLog,
	pub settings: SettingsAccessor,
	pub policy: PasswordPolicy,
}

impl std::fmt::Debug for AuthState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthState")
			.field("store", &self.store)
			.field("bcrypt_cost", &self.opts.bcrypt_cost)
			.field("session_ttl", &self.opts.session_ttl)
			.finish_non_exhaustive()
	}
}

pub type App = Arc<AuthState>;

pub struct AppBuilder {
	opts: AuthOpts,
	policy: Option<PasswordPolicy>,
	system_actor: Option<SystemActorCache>,
	store: Option<Arc<dyn StoreAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder {
			opts: AuthOpts {
				bcrypt_cost: DEFAULT_BCRYPT_COST,
				session_secret: "".into(),
				session_ttl: DEFAULT_SESSION_TTL,
				system_password_length: DEFAULT_SYSTEM_PASSWORD_LENGTH,
			},
			policy: None,
			system_actor: None,
			store: None,
		}
	}

	// Opts
	pub fn bcrypt_cost(&mut self, cost: u32) -> &mut Self {
		self.opts.bcrypt_cost = cost;
		self
	}
	pub fn session_secret(&mut self, secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.session_secret = secret.into();
		self
	}
	pub fn session_ttl(&mut self, ttl: i64) -> &mut Self {
		self.opts.session_ttl = ttl;
		self
	}
	pub fn system_password_length(&mut self, length: usize) -> &mut Self {
		self.opts.system_password_length = length;
		self
	}
	pub fn password_policy(&mut self, policy: PasswordPolicy) -> &mut Self {
		self.policy = Some(policy);
		self
	}
	/// Replace the lazily populated system actor cache
	pub fn system_actor_cache(&mut self, cache: SystemActorCache) -> &mut Self {
		self.system_actor = Some(cache);
		self
	}

	// Adapters
	pub fn store(&mut self, store: Arc<dyn StoreAdapter>) -> &mut Self {
		self.store = Some(store);
		self
	}

	pub fn build(&mut self) -> GhResult<App> {
		let store =
			self.store.clone().ok_or_else(|| Error::ConfigError("no store adapter".into()))?;

		if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.opts.bcrypt_cost) {
			return Err(Error::ConfigError(format!(
				"bcrypt cost must be between {} and {}",
				MIN_BCRYPT_COST, MAX_BCRYPT_COST
			)));
		}
		if self.opts.session_secret.is_empty() {
			return Err(Error::ConfigError("session secret is required".into()));
		}
		if self.opts.session_ttl <= 0 {
			return Err(Error::ConfigError("session ttl must be positive".into()));
		}
		if self.opts.system_password_length < crate::password::MIN_LENGTH {
			return Err(Error::ConfigError(format!(
				"system password length must be at least {}",
				crate::password::MIN_LENGTH
			)));
		}

		let policy = match self.policy.take() {
			Some(policy) => policy,
			None => PasswordPolicy::standard()?,
		};
		let system_actor = self.system_actor.take().unwrap_or_default();

		Ok(Arc::new(AuthState {
			mutation_log: MutationLog::new(store.clone(), system_actor),
			settings: SettingsAccessor::new(store.clone()),
			store,
			opts: self.opts.clone(),
			policy,
		}))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
