//! Error type shared by the core and the store adapters.

use crate::types::UserId;

pub type GhResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	DbError,
	Internal(String),
	ValidationError(String),
	ConfigError(String),
	AlreadyExists(String),

	/// Requested password length is below the minimum of 4
	InvalidLength(usize),
	/// Mutation log actor does not reference an existing user
	ActorNotFound(UserId),
	/// No user holds the `system` role
	SystemActorMissing,
	/// Setting row is absent from the store
	SettingNotFound(&'static str),
}

/// Coarse classification of errors, used by callers deciding how to surface them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
	InvalidInput,
	NotFound,
	AlreadyExists,
	Dependency,
	Internal,
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::ValidationError(_) | Error::InvalidLength(_) | Error::PermissionDenied => {
				ErrorKind::InvalidInput
			}
			Error::NotFound
			| Error::ActorNotFound(_)
			| Error::SystemActorMissing
			| Error::SettingNotFound(_) => ErrorKind::NotFound,
			Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
			Error::DbError => ErrorKind::Dependency,
			Error::Internal(_) | Error::ConfigError(_) => ErrorKind::Internal,
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::AlreadyExists(msg) => write!(f, "{}", msg),
			Error::InvalidLength(len) => {
				write!(f, "password length must be at least 4 (requested {})", len)
			}
			Error::ActorNotFound(id) => write!(f, "mutation log actor {} not found", id),
			Error::SystemActorMissing => write!(f, "system user not found"),
			Error::SettingNotFound(name) => write!(f, "setting \"{}\" not found", name),
		}
	}
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_kinds() {
		assert_eq!(Error::ValidationError("x".into()).kind(), ErrorKind::InvalidInput);
		assert_eq!(Error::SettingNotFound("user:signInTries").kind(), ErrorKind::NotFound);
		assert_eq!(Error::ActorNotFound(UserId(7)).kind(), ErrorKind::NotFound);
		assert_eq!(Error::SystemActorMissing.kind(), ErrorKind::NotFound);
		assert_eq!(Error::AlreadyExists("dup".into()).kind(), ErrorKind::AlreadyExists);
		assert_eq!(Error::DbError.kind(), ErrorKind::Dependency);
	}

	#[test]
	fn test_already_exists_message_is_verbatim() {
		let err = Error::AlreadyExists("Admin user already exists".into());
		assert_eq!(err.to_string(), "Admin user already exists");
	}
}

// vim: ts=4
