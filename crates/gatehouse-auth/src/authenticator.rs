//! Credential authenticator
//!
//! Every authentication failure, including malformed input, yields `Ok(None)`
//! so callers cannot tell a bad email from a bad password. Only store failures
//! surface as errors.

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use zeroize::Zeroizing;

use crate::crypto;
use crate::defaults::SYSTEM_ROLE;
use crate::mutation_log::MutationCategory;
use crate::prelude::*;
use gatehouse_types::store_adapter::UserRecord;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
		.ok()
});

/// Reserved top level domain, never deliverable
const RESERVED_TLD: &str = "invalid";

pub(crate) fn is_valid_email(email: &str) -> bool {
	let Some(re) = EMAIL_RE.as_ref() else {
		return false;
	};
	if !re.is_match(email) || email.starts_with('.') || email.contains("..") {
		return false;
	}
	email.rsplit('.').next().is_some_and(|tld| !tld.eq_ignore_ascii_case(RESERVED_TLD))
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

impl Credentials {
	fn is_well_formed(&self) -> bool {
		is_valid_email(&self.email) && !self.password.is_empty()
	}
}

/// An authenticated user with its resolved authorization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub id: UserId,
	pub name: Box<str>,
	pub email: Box<str>,
	pub roles: Vec<Box<str>>,
	pub permissions: Vec<Box<str>>,
}

impl From<UserRecord> for Principal {
	fn from(user: UserRecord) -> Self {
		let permissions = user
			.roles
			.iter()
			.flat_map(|role| role.permissions.iter().cloned())
			.unique()
			.collect();
		let roles = user.roles.into_iter().map(|role| role.name).collect();
		Principal { id: user.id, name: user.name, email: user.email, roles, permissions }
	}
}

/// Verify credentials and resolve the principal
pub async fn authorize(app: &App, credentials: &Credentials) -> GhResult<Option<Principal>> {
	if !credentials.is_well_formed() {
		debug!("Rejected malformed credentials");
		return Ok(None);
	}

	let Some(user) = app.store.find_user_by_email(&credentials.email).await? else {
		// Same bcrypt work as a wrong password, so timing does not reveal unknown emails
		let password = Zeroizing::new(credentials.password.clone());
		crypto::generate_password_hash(password, app.opts.bcrypt_cost).await?;
		debug!("Sign in failed");
		return Ok(None);
	};

	// The system actor is never a login principal
	if user.roles.iter().any(|role| role.name.as_ref() == SYSTEM_ROLE) {
		warn!(user_id = %user.id, "Sign in attempted for the system account");
		return Ok(None);
	}

	let password = Zeroizing::new(credentials.password.clone());
	if !crypto::check_password(password, user.password_hash.clone()).await? {
		debug!("Sign in failed");
		return Ok(None);
	}

	app.mutation_log
		.append(user.id, MutationCategory::AuthModule, &format!("Signed in: {}", user.email))
		.await?;
	info!(user_id = %user.id, "Signed in");

	Ok(Some(Principal::from(user)))
}


// vim: ts=4
