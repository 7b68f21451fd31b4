// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User records and registration validation.
//!
//! This module provides:
//! - [`User`] - the account record, including its current session
//! - [`NewUser`] - validated registration input
//! - [`validate_registration`] - username/password/email checks for sign-up

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::types::{Permissions, UserId, ADMIN_ROLE, DEFAULT_ROLE};

/// Minimum length for usernames and passwords at registration.
pub const MIN_REGISTRATION_LEN: usize = 3;

static EMAIL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").unwrap());

/// A registered account.
///
/// `token` is empty and `session_expires_at` is 0 while logged out. The
/// password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub role: String,
	pub username: String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
	pub email: String,
	#[serde(skip)]
	pub password_hash: String,
	#[serde(default)]
	pub token: String,
	/// Session expiry in epoch seconds, 0 when there is no session.
	#[serde(default)]
	pub session_expires_at: i64,
	/// Recomputed on every authenticated request.
	#[serde(default)]
	pub permissions: Permissions,
}

impl User {
	pub fn has_role(&self) -> bool {
		!self.role.trim().is_empty()
	}

	/// Returns true if the user may administer other accounts.
	pub fn is_privileged(&self) -> bool {
		self.role == ADMIN_ROLE
	}

	pub fn is_logged_in(&self) -> bool {
		self.session_expires_at != 0
	}

	/// Drop the password hash before the record leaves the auth layer.
	pub fn scrubbed(mut self) -> Self {
		self.password_hash.clear();
		self
	}
}

/// Registration input after validation. Role is always [`DEFAULT_ROLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
	pub role: String,
	pub username: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
}

impl NewUser {
	pub fn new(
		username: impl Into<String>,
		email: impl Into<String>,
		first_name: impl Into<String>,
		last_name: impl Into<String>,
	) -> Self {
		Self {
			role: DEFAULT_ROLE.to_string(),
			username: username.into(),
			first_name: first_name.into(),
			last_name: last_name.into(),
			email: email.into(),
		}
	}
}

pub fn is_valid_email(email: &str) -> bool {
	EMAIL_REGEX.is_match(email)
}

/// Login identifiers containing `@` name an email, anything else a username.
pub fn is_email_identifier(identifier: &str) -> bool {
	identifier.contains('@')
}

/// Check sign-up input.
///
/// Username and password need at least [`MIN_REGISTRATION_LEN`] characters,
/// then the email must look like an address. Usernames may not contain `@`,
/// so a username can never shadow someone's email at login.
pub fn validate_registration(username: &str, password: &str, email: &str) -> Result<(), AuthError> {
	if username.chars().count() < MIN_REGISTRATION_LEN {
		return Err(AuthError::InvalidRegistration(format!(
			"username must be at least {MIN_REGISTRATION_LEN} characters"
		)));
	}

	if is_email_identifier(username) {
		return Err(AuthError::InvalidRegistration(
			"username must not contain '@'".to_string(),
		));
	}

	if password.chars().count() < MIN_REGISTRATION_LEN {
		return Err(AuthError::InvalidRegistration(format!(
			"password must be at least {MIN_REGISTRATION_LEN} characters"
		)));
	}

	if !is_valid_email(email) {
		return Err(AuthError::InvalidEmail);
	}

	Ok(())
}
