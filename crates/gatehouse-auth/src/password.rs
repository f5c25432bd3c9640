//! Secure random password generation
//!
//! Generated passwords always contain at least one lowercase letter, one
//! uppercase letter, one digit and one special character. Characters never
//! repeat unless the requested length exceeds the number of distinct
//! characters available.
//!
//! All randomness comes from `rand::rng()`, a ChaCha based CSPRNG seeded and
//! periodically reseeded from the operating system.

use rand::RngExt;
use rand::rngs::ThreadRng;
use zeroize::Zeroizing;

use crate::prelude::*;

pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &[u8] = b"0123456789";
pub const SPECIAL: &[u8] = b"!@#$%^&*()_+[]{}|;:,.<>?";

const POOLS: [&[u8]; 4] = [LOWERCASE, UPPERCASE, DIGITS, SPECIAL];

/// Shortest password that can hold one character of every category
pub const MIN_LENGTH: usize = POOLS.len();

/// Number of distinct characters across all pools
pub const TOTAL_UNIQUE: usize = LOWERCASE.len() + UPPERCASE.len() + DIGITS.len() + SPECIAL.len();

/// Generate a random password of `length` characters
pub fn generate_password(length: usize) -> GhResult<Zeroizing<String>> {
	if length < MIN_LENGTH {
		return Err(Error::InvalidLength(length));
	}

	let mut rng = rand::rng();
	let mut chars: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(length));

	if length <= TOTAL_UNIQUE {
		// One from each category first, then draw without replacement from the rest
		let mut remaining: Vec<u8> = Vec::with_capacity(TOTAL_UNIQUE);
		for pool in POOLS {
			let mut pool = pool.to_vec();
			let idx = rng.random_range(0..pool.len());
			chars.push(pool.swap_remove(idx));
			remaining.append(&mut pool);
		}
		for _ in MIN_LENGTH..length {
			let idx = rng.random_range(0..remaining.len());
			chars.push(remaining.swap_remove(idx));
		}
	} else {
		// Every distinct character once, then the surplus with replacement
		let all = POOLS.concat();
		chars.extend_from_slice(&all);
		for _ in TOTAL_UNIQUE..length {
			chars.push(all[rng.random_range(0..all.len())]);
		}
	}

	secure_shuffle(&mut rng, &mut chars);

	Ok(Zeroizing::new(chars.iter().copied().map(char::from).collect()))
}

/// Fisher-Yates shuffle
fn secure_shuffle(rng: &mut ThreadRng, items: &mut [u8]) {
	for i in (1..items.len()).rev() {
		let j = rng.random_range(0..=i);
		items.swap(i, j);
	}
}


// vim: ts=4
