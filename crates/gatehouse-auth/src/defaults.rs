//! Baseline data installed by the bootstrap seeder

use crate::settings::SettingName;

pub const SYSTEM_ROLE: &str = "system";
pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

pub const SYSTEM_USER_NAME: &str = "System";

/// Reserved email of the system user.
/// The `.invalid` TLD (RFC 2606) can never belong to a real mailbox and is
/// rejected by credential validation, so it never collides with an enrolled user.
pub const SYSTEM_USER_EMAIL: &str = "system@gatehouse.invalid";

pub const DEFAULT_SETTINGS: &[(SettingName, &str)] = &[
	(SettingName::SeedingComplete, "false"),
	(SettingName::SignInTries, "5"),
	(SettingName::PasswordHistory, "5"),
];

pub const DEFAULT_PERMISSIONS: &[&str] = &["users:read", "users:write"];

/// A role and the exact permission set it converges to on every seeding run
#[derive(Debug)]
pub struct DefaultRole {
	pub name: &'static str,
	pub permissions: &'static [&'static str],
}

pub const DEFAULT_ROLES: &[DefaultRole] = &[
	DefaultRole { name: USER_ROLE, permissions: &["users:read"] },
	DefaultRole { name: ADMIN_ROLE, permissions: &["users:read", "users:write"] },
	DefaultRole { name: SYSTEM_ROLE, permissions: &[] },
];


// vim: ts=4
