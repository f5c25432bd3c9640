//! First administrator setup

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::authenticator::is_valid_email;
use crate::crypto;
use crate::defaults::ADMIN_ROLE;
use crate::mutation_log::MutationCategory;
use crate::prelude::*;
use gatehouse_types::store_adapter::CreateUserData;

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupAdminReq {
	pub name: String,
	pub email: String,
	pub password: String,
	pub confirm_password: String,
}

impl std::fmt::Debug for SetupAdminReq {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SetupAdminReq")
			.field("name", &self.name)
			.field("email", &self.email)
			.finish_non_exhaustive()
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdminUser {
	pub id: UserId,
	pub name: Box<str>,
	pub email: Box<str>,
}

fn admin_exists() -> Error {
	Error::AlreadyExists("Admin user already exists".into())
}

/// Every problem with the request, in a stable order
fn validate(app: &App, req: &SetupAdminReq) -> Vec<String> {
	let mut issues = Vec::new();
	if req.name.trim().is_empty() {
		issues.push("Name is required".to_string());
	}
	if !is_valid_email(&req.email) {
		issues.push("Invalid email".to_string());
	}
	if req.password != req.confirm_password {
		issues.push("Passwords do not match".to_string());
	}
	issues.extend(app.policy.validate(&req.password).iter().map(|c| c.message.to_string()));
	issues
}

/// Create the first user holding the `admin` role
///
/// The user row and its role assignment are written in one store transaction,
/// so of several concurrent callers exactly one succeeds.
pub async fn setup_admin(app: &App, req: &SetupAdminReq) -> GhResult<AdminUser> {
	let issues = validate(app, req);
	if !issues.is_empty() {
		return Err(Error::ValidationError(issues.join("; ")));
	}

	// Fails early on an unseeded store
	app.mutation_log.resolve_system_actor_id().await?;

	// Skips the bcrypt work in the common case
	if app.store.count_users_with_role(ADMIN_ROLE).await? > 0 {
		return Err(admin_exists());
	}

	let password_hash =
		crypto::generate_password_hash(Zeroizing::new(req.password.clone()), app.opts.bcrypt_cost)
			.await?;
	let name = req.name.trim();
	let created = app
		.store
		.create_first_user_with_role(
			ADMIN_ROLE,
			CreateUserData { name, email: &req.email, password_hash: &password_hash },
		)
		.await?;
	let Some(id) = created else {
		return Err(admin_exists());
	};

	app.mutation_log
		.append_as_system(MutationCategory::AdminSetup, &format!("Created admin user: {}", req.email))
		.await?;
	info!(user_id = %id, "Admin user created");

	Ok(AdminUser { id, name: name.into(), email: req.email.as_str().into() })
}

// vim: ts=4
