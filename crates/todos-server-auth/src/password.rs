// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password hashing and verification (Argon2id, PHC string format).

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::rngs::OsRng;
use tracing::instrument;

use crate::argon2_config::argon2_instance;
use crate::error::AuthError;

/// Hash a plaintext password with a fresh random salt.
#[instrument(level = "debug", skip_all)]
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a plaintext password against a stored PHC hash.
///
/// Comparison is constant-time. An unparseable stored hash never verifies.
#[instrument(level = "debug", skip_all)]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(stored_hash) else {
		tracing::warn!("stored password hash is not a valid PHC string");
		return false;
	};

	argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn hash_produces_argon2id_phc_string() {
		let hash = hash_password("correct horse").unwrap();
		assert!(hash.starts_with("$argon2id$"));
	}

	#[test]
	fn correct_password_verifies() {
		let hash = hash_password("correct horse").unwrap();
		assert!(verify_password("correct horse", &hash));
	}

	#[test]
	fn wrong_password_fails() {
		let hash = hash_password("correct horse").unwrap();
		assert!(!verify_password("battery staple", &hash));
	}

	#[test]
	fn same_password_gets_different_salts() {
		let a = hash_password("pw").unwrap();
		let b = hash_password("pw").unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn invalid_stored_hash_fails() {
		assert!(!verify_password("pw", "not-a-hash"));
		assert!(!verify_password("pw", ""));
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(16))]

		#[test]
		fn prop_hash_then_verify(password in "[ -~]{1,32}") {
			let hash = hash_password(&password).unwrap();
			prop_assert!(verify_password(&password, &hash));
		}
	}
}
