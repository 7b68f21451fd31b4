// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying `{sub, exp, iat}` where `sub` is the
//! username. Any other algorithm, including `none`, is rejected as malformed.
//! Expiry is not checked here: the validator compares `exp` against the clock
//! itself so an expired but authentic token can still be attributed to a user
//! at logout.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use todos_common_config::SecretString;

use crate::error::AuthError;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	/// Username the token was issued for.
	pub sub: String,
	/// Expiry, epoch seconds.
	pub exp: i64,
	/// Issued at, epoch seconds.
	pub iat: i64,
}

impl Claims {
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.exp <= now.timestamp()
	}
}

/// Mints and verifies HS256 tokens with one injected key.
#[derive(Clone)]
pub struct TokenSigner {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenSigner")
			.field("algorithm", &Algorithm::HS256)
			.finish_non_exhaustive()
	}
}

impl TokenSigner {
	pub fn new(key: &SecretString) -> Self {
		Self::from_bytes(key.expose().as_bytes())
	}

	pub fn from_bytes(key: &[u8]) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.validate_exp = false;
		validation.required_spec_claims.clear();
		validation.required_spec_claims.insert("sub".to_string());

		Self {
			encoding_key: EncodingKey::from_secret(key),
			decoding_key: DecodingKey::from_secret(key),
			validation,
		}
	}

	/// Mint a token for `subject` expiring at `expires_at`.
	pub fn mint(&self, subject: &str, expires_at: DateTime<Utc>) -> Result<String, AuthError> {
		let claims = Claims {
			sub: subject.to_string(),
			exp: expires_at.timestamp(),
			iat: Utc::now().timestamp(),
		};

		jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
			.map_err(|e| AuthError::Token(e.to_string()))
	}

	/// Parse and verify a token, returning its claims.
	///
	/// # Errors
	/// - [`AuthError::BadSignature`] if the HS256 signature does not verify.
	/// - [`AuthError::MalformedToken`] for everything else: bad encoding,
	///   unexpected algorithm, missing claims.
	pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
		jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| match e.kind() {
				ErrorKind::InvalidSignature => AuthError::BadSignature,
				_ => AuthError::MalformedToken,
			})
	}
}

/// SHA-256 hex digest of a token, for comparisons that should not short-circuit
/// on the first differing byte of the raw token.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	use super::*;
	use base64::engine::general_purpose::URL_SAFE_NO_PAD;
	use base64::Engine;
	use chrono::Duration;

	fn signer() -> TokenSigner {
		TokenSigner::from_bytes(b"test-signing-key")
	}

	#[test]
	fn minted_token_verifies() {
		let expires_at = Utc::now() + Duration::hours(48);
		let token = signer().mint("alice", expires_at).unwrap();

		let claims = signer().verify(&token).unwrap();
		assert_eq!(claims.sub, "alice");
		assert_eq!(claims.exp, expires_at.timestamp());
		assert!(!claims.is_expired_at(Utc::now()));
	}

	#[test]
	fn expired_token_still_verifies_signature() {
		let token = signer()
			.mint("alice", Utc::now() - Duration::hours(1))
			.unwrap();

		let claims = signer().verify(&token).unwrap();
		assert!(claims.is_expired_at(Utc::now()));
	}

	#[test]
	fn wrong_key_is_bad_signature() {
		let token = signer()
			.mint("alice", Utc::now() + Duration::hours(1))
			.unwrap();
		let other = TokenSigner::from_bytes(b"another-key");

		assert!(matches!(other.verify(&token), Err(AuthError::BadSignature)));
	}

	#[test]
	fn hs512_token_is_malformed() {
		let claims = Claims {
			sub: "alice".to_string(),
			exp: (Utc::now() + Duration::hours(1)).timestamp(),
			iat: Utc::now().timestamp(),
		};
		let token = jsonwebtoken::encode(
			&Header::new(Algorithm::HS512),
			&claims,
			&EncodingKey::from_secret(b"test-signing-key"),
		)
		.unwrap();

		assert!(matches!(signer().verify(&token), Err(AuthError::MalformedToken)));
	}

	#[test]
	fn alg_none_token_is_malformed() {
		let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"alice","exp":4102444800,"iat":0}"#);
		let token = format!("{header}.{payload}.");

		assert!(matches!(signer().verify(&token), Err(AuthError::MalformedToken)));
	}

	#[test]
	fn garbage_is_malformed() {
		assert!(matches!(signer().verify("not.a.jwt"), Err(AuthError::MalformedToken)));
		assert!(matches!(signer().verify(""), Err(AuthError::MalformedToken)));
	}

	#[test]
	fn debug_does_not_leak_key() {
		let debug = format!("{:?}", signer());
		assert!(!debug.contains("test-signing-key"));
	}

	#[test]
	fn hash_produces_hex_sha256_format() {
		let hash = hash_token("abc");
		assert_eq!(hash.len(), 64);
		assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
		assert_eq!(hash, hash_token("abc"));
		assert_ne!(hash, hash_token("abd"));
	}
}
