//! Password strength policy
//!
//! A policy is an ordered list of named constraints. Validation evaluates
//! every constraint so all violations can be reported at once.

use regex::Regex;

use crate::password::SPECIAL;
use crate::prelude::*;

/// A single named password constraint
#[derive(Debug, Clone)]
pub struct PasswordConstraint {
	pub name: Box<str>,
	pub message: Box<str>,
	pattern: Regex,
}

impl PasswordConstraint {
	/// Create a constraint satisfied when `pattern` matches somewhere in the password
	pub fn new(
		name: impl Into<Box<str>>,
		message: impl Into<Box<str>>,
		pattern: &str,
	) -> GhResult<Self> {
		let name = name.into();
		let pattern = Regex::new(pattern).map_err(|err| {
			Error::ConfigError(format!("Invalid pattern for password constraint {}: {}", name, err))
		})?;
		Ok(Self { name, message: message.into(), pattern })
	}

	pub fn is_satisfied_by(&self, password: &str) -> bool {
		self.pattern.is_match(password)
	}
}

#[derive(Debug, Clone, Default)]
pub struct PasswordPolicy {
	constraints: Vec<PasswordConstraint>,
}

impl PasswordPolicy {
	/// Empty policy, every password passes
	pub fn new() -> Self {
		Self { constraints: Vec::new() }
	}

	/// The standard policy: at least 8 characters with lowercase, uppercase, digit
	/// and special characters. The special set is the one the password generator draws from.
	pub fn standard() -> GhResult<Self> {
		let special = format!("[{}]", regex::escape(&String::from_utf8_lossy(SPECIAL)));
		Ok(Self::new()
			.with_constraint(PasswordConstraint::new(
				"minLength",
				"Password must be at least 8 characters",
				".{8,}",
			)?)
			.with_constraint(PasswordConstraint::new(
				"lowercase",
				"Password must contain at least one lowercase letter",
				"[a-z]",
			)?)
			.with_constraint(PasswordConstraint::new(
				"uppercase",
				"Password must contain at least one uppercase letter",
				"[A-Z]",
			)?)
			.with_constraint(PasswordConstraint::new(
				"number",
				"Password must contain at least one number",
				"[0-9]",
			)?)
			.with_constraint(PasswordConstraint::new(
				"special",
				"Password must contain at least one special character",
				&special,
			)?))
	}

	/// Append a constraint
	pub fn with_constraint(mut self, constraint: PasswordConstraint) -> Self {
		self.constraints.push(constraint);
		self
	}

	pub fn constraints(&self) -> &[PasswordConstraint] {
		&self.constraints
	}

	/// Return every violated constraint, in policy order
	pub fn validate(&self, password: &str) -> Vec<&PasswordConstraint> {
		self.constraints.iter().filter(|c| !c.is_satisfied_by(password)).collect()
	}

	/// Like `validate`, folded into a single `ValidationError`
	pub fn check(&self, password: &str) -> GhResult<()> {
		let violations = self.validate(password);
		if violations.is_empty() {
			return Ok(());
		}
		Err(Error::ValidationError(
			violations.iter().map(|c| c.message.as_ref()).collect::<Vec<_>>().join("; "),
		))
	}
}


// vim: ts=4
