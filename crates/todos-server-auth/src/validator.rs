// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token validation.
//!
//! Checks run in a fixed order so each failure has one meaning:
//!
//! 1. signature and algorithm (`MalformedToken`, `BadSignature`)
//! 2. user lookup by the token subject (`UserNotFound`)
//! 3. stored session present (`NotLoggedIn`)
//! 4. stored expiry, token expiry and stored token match (`SessionExpired`)
//!
//! The stored session is authoritative for liveness. The token only proves
//! who it was issued to.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::error::AuthError;
use crate::store::UserStore;
use crate::token::{hash_token, Claims, TokenSigner};
use crate::user::User;

pub struct TokenValidator {
	store: Arc<dyn UserStore>,
	signer: TokenSigner,
}

impl TokenValidator {
	pub fn new(store: Arc<dyn UserStore>, signer: TokenSigner) -> Self {
		Self { store, signer }
	}

	/// Verify only the signature, ignoring any session state.
	pub fn verify_signature(&self, token: &str) -> Result<Claims, AuthError> {
		self.signer.verify(token)
	}

	/// Resolve a token to its user, with the password hash scrubbed.
	#[instrument(skip_all, fields(username = tracing::field::Empty))]
	pub async fn validate(&self, token: &str) -> Result<User, AuthError> {
		let claims = self.signer.verify(token)?;
		tracing::Span::current().record("username", claims.sub.as_str());

		let user = self
			.store
			.find_user_by_identifier(&claims.sub)
			.await?
			.ok_or(AuthError::UserNotFound)?;

		if !user.is_logged_in() {
			return Err(AuthError::NotLoggedIn);
		}

		let now = Utc::now();
		if user.session_expires_at <= now.timestamp() || claims.is_expired_at(now) {
			tracing::debug!(user_id = user.id, "session past expiry");
			return Err(AuthError::SessionExpired);
		}

		if hash_token(&user.token) != hash_token(token) {
			tracing::debug!(user_id = user.id, "token superseded by a newer login");
			return Err(AuthError::SessionExpired);
		}

		Ok(user.scrubbed())
	}
}
