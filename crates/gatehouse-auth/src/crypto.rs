//! Password hashing
//!
//! Bcrypt is CPU bound, so both directions run on tokio's blocking pool.

use zeroize::Zeroizing;

use crate::prelude::*;

fn generate_password_hash_sync(password: &str, cost: u32) -> GhResult<Box<str>> {
	let hash = bcrypt::hash(password, cost).map_err(|err| {
		error!("bcrypt hash failed: {}", err);
		Error::Internal("password hashing failed".into())
	})?;

	Ok(hash.into())
}

pub async fn generate_password_hash(
	password: Zeroizing<String>,
	cost: u32,
) -> GhResult<Box<str>> {
	tokio::task::spawn_blocking(move || generate_password_hash_sync(&password, cost))
		.await
		.map_err(|err| Error::Internal(format!("hashing task failed: {}", err)))?
}

/// Bcrypt compares the recomputed digest in constant time.
/// A malformed stored hash never matches.
fn check_password_sync(password: &str, password_hash: &str) -> bool {
	bcrypt::verify(password, password_hash)
		.inspect_err(|err| debug!("bcrypt verify failed: {}", err))
		.unwrap_or(false)
}

pub async fn check_password(
	password: Zeroizing<String>,
	password_hash: Box<str>,
) -> GhResult<bool> {
	tokio::task::spawn_blocking(move || check_password_sync(&password, &password_hash))
		.await
		.map_err(|err| Error::Internal(format!("verification task failed: {}", err)))
}


// vim: ts=4
