//! Bootstrap seeder
//!
//! Installs the system user, default settings, permissions and roles exactly
//! once per deployment. The `system:seedingComplete` flag is the only gate:
//! every step before it is an idempotent upsert, so an interrupted or
//! concurrent run converges to the same end state when repeated.

use itertools::Itertools;

use crate::crypto;
use crate::defaults::{
	DEFAULT_PERMISSIONS, DEFAULT_ROLES, DEFAULT_SETTINGS, SYSTEM_ROLE, SYSTEM_USER_EMAIL,
	SYSTEM_USER_NAME,
};
use crate::mutation_log::MutationCategory;
use crate::password;
use crate::prelude::*;
use crate::settings::SettingName;
use gatehouse_types::store_adapter::CreateUserData;

const CATEGORY: MutationCategory = MutationCategory::DatabaseSeeder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
	AlreadySeeded,
	Seeded,
}

async fn is_seeding_complete(app: &App) -> GhResult<bool> {
	match app.settings.get::<bool>(SettingName::SeedingComplete).await {
		Ok(complete) => Ok(complete),
		Err(Error::SettingNotFound(_)) => {
			info!("No seeding data found, start seeding");
			Ok(false)
		}
		Err(Error::ValidationError(msg)) => {
			warn!("Seeding flag is not a boolean ({}), seeding again", msg);
			Ok(false)
		}
		Err(err) => Err(err),
	}
}

/// The system user gets the hash of a random password nobody ever sees
async fn upsert_system_user(app: &App) -> GhResult<UserId> {
	let unknowable = password::generate_password(app.opts.system_password_length)?;
	let password_hash = crypto::generate_password_hash(unknowable, app.opts.bcrypt_cost).await?;

	app.store
		.upsert_user(
			SYSTEM_USER_EMAIL,
			CreateUserData {
				name: SYSTEM_USER_NAME,
				email: SYSTEM_USER_EMAIL,
				password_hash: &password_hash,
			},
		)
		.await
}

/// Run the seeding state machine once
pub async fn seed_default_data(app: &App) -> GhResult<SeedOutcome> {
	if is_seeding_complete(app).await? {
		info!("Seeding already complete");
		return Ok(SeedOutcome::AlreadySeeded);
	}

	// System user, the actor of every entry below including its own
	let system_id = upsert_system_user(app).await?;
	app.mutation_log.append(system_id, CATEGORY, "Upserted system user").await?;
	info!(user_id = %system_id, "System user seeded");

	// Settings never overwrite operator adjusted values
	for (name, default) in DEFAULT_SETTINGS {
		let value = app.settings.create_if_missing(*name, default).await?;
		let description = format!("Upserted setting: {} with value: {}", name, value);
		debug!("{}", description);
		app.mutation_log.append(system_id, CATEGORY, &description).await?;
	}

	for permission in DEFAULT_PERMISSIONS {
		app.store.upsert_permission(permission).await?;
		let description = format!("Upserted permission: {}", permission);
		debug!("{}", description);
		app.mutation_log.append(system_id, CATEGORY, &description).await?;
	}

	// Role permission sets are replaced so drifted roles converge to the defaults
	for role in DEFAULT_ROLES {
		app.store.upsert_role(role.name).await?;
		app.store.replace_role_permissions(role.name, role.permissions).await?;
		let description = format!(
			"Upserted role: {} with permissions: {}",
			role.name,
			role.permissions.iter().join(", ")
		);
		debug!("{}", description);
		app.mutation_log.append(system_id, CATEGORY, &description).await?;
	}

	app.store.attach_role(system_id, SYSTEM_ROLE).await?;
	app.mutation_log.append(system_id, CATEGORY, "Attached system role to system user").await?;

	app.settings.set(SettingName::SeedingComplete, &true).await?;
	info!("Seeding complete");

	Ok(SeedOutcome::Seeded)
}

/// Seed at startup. Failures are logged and retried on the next start.
pub async fn run(app: &App) {
	if let Err(err) = seed_default_data(app).await {
		error!(error = %err, "Seeding failed, it will be retried on next startup");
	}
}

// vim: ts=4
