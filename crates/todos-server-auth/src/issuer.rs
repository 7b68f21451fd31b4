// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential checks and session issuance.
//!
//! # Login Flow
//!
//! ```text
//! (identifier, password) → lookup → Argon2 verify → role check → mint token → persist session
//! ```
//!
//! A successful issuance writes to the store exactly once. Failures never write.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::instrument;

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::store::UserStore;
use crate::token::TokenSigner;
use crate::types::SESSION_LIFETIME_HOURS;
use crate::user::User;

/// New passwords must be longer than this many characters.
pub const MIN_NEW_PASSWORD_LEN: usize = 4;

pub struct CredentialIssuer {
	store: Arc<dyn UserStore>,
	signer: TokenSigner,
	session_lifetime: Duration,
}

impl CredentialIssuer {
	pub fn new(store: Arc<dyn UserStore>, signer: TokenSigner) -> Self {
		Self {
			store,
			signer,
			session_lifetime: Duration::hours(SESSION_LIFETIME_HOURS),
		}
	}

	pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
		self.session_lifetime = lifetime;
		self
	}

	pub fn session_lifetime(&self) -> Duration {
		self.session_lifetime
	}

	/// Verify credentials and start a session.
	///
	/// Returns the user (password hash scrubbed, token and expiry set) and the
	/// new token. The token subject is the user's username, whichever
	/// identifier was used to log in.
	#[instrument(skip_all, fields(identifier = %identifier))]
	pub async fn issue(&self, identifier: &str, password: &str) -> Result<(User, String), AuthError> {
		if identifier.is_empty() || password.is_empty() {
			return Err(AuthError::MissingCredential);
		}

		let mut user = self
			.store
			.find_user_by_identifier(identifier)
			.await?
			.ok_or(AuthError::UserNotFound)?;

		if !verify_password(password, &user.password_hash) {
			tracing::debug!(user_id = user.id, "password mismatch");
			return Err(AuthError::InvalidCredential);
		}

		if !user.has_role() {
			tracing::warn!(user_id = user.id, "login refused, user has no role");
			return Err(AuthError::RoleNotAssigned);
		}

		let expires_at = Utc::now() + self.session_lifetime;
		let token = self.signer.mint(&user.username, expires_at)?;

		self.store
			.persist_session(&user.username, &token, expires_at.timestamp())
			.await?;

		user.token = token.clone();
		user.session_expires_at = expires_at.timestamp();
		tracing::info!(user_id = user.id, username = %user.username, "session issued");

		Ok((user.scrubbed(), token))
	}

	/// Replace a user's password after checking the old one.
	///
	/// Length of the new password is checked before the store is touched.
	#[instrument(skip_all, fields(username = %username))]
	pub async fn change_password(
		&self,
		username: &str,
		old_password: &str,
		new_password: &str,
	) -> Result<(), AuthError> {
		if old_password.is_empty() || new_password.is_empty() {
			return Err(AuthError::MissingCredential);
		}

		if new_password.chars().count() <= MIN_NEW_PASSWORD_LEN {
			return Err(AuthError::WeakPassword);
		}

		let user = self
			.store
			.find_user_by_identifier(username)
			.await?
			.ok_or(AuthError::UserNotFound)?;

		if !verify_password(old_password, &user.password_hash) {
			return Err(AuthError::InvalidCredential);
		}

		let hash = hash_password(new_password)?;
		self.store.update_password(&user.username, &hash).await?;

		tracing::info!(user_id = user.id, "password changed");
		Ok(())
	}

	/// End the session of `username`. Missing users are not an error.
	#[instrument(skip_all, fields(username = %username))]
	pub async fn revoke(&self, username: &str) -> Result<(), AuthError> {
		self.store.clear_session(username).await?;
		tracing::info!("session cleared");
		Ok(())
	}
}
