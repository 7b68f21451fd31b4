// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization error types.

use thiserror::Error;

use crate::policy::PolicyError;

/// Failure reported by a [`UserStore`](crate::store::UserStore) implementation.
///
/// The underlying error is kept as the source so callers can still log it.
#[derive(Debug, Error)]
#[error("user store error: {source}")]
pub struct StoreError {
	#[source]
	source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl StoreError {
	pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
		Self {
			source: source.into(),
		}
	}
}

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
	// =========================================================================
	// Credential Errors
	// =========================================================================
	/// Identifier or password was empty, or no Basic credentials were sent.
	#[error("missing credentials")]
	MissingCredential,

	/// The password did not match the stored hash.
	#[error("invalid credentials")]
	InvalidCredential,

	/// No user matches the identifier.
	#[error("user not found")]
	UserNotFound,

	/// The user exists but has no role-name.
	#[error("no role assigned to user")]
	RoleNotAssigned,

	/// New password is too short.
	#[error("password must be longer than 4 characters")]
	WeakPassword,

	/// Registration payload failed validation.
	#[error("invalid registration: {0}")]
	InvalidRegistration(String),

	/// Email does not look like an address.
	#[error("invalid email address")]
	InvalidEmail,

	// =========================================================================
	// Token Errors
	// =========================================================================
	/// The token could not be parsed or was not signed with HS256.
	#[error("malformed token")]
	MalformedToken,

	/// The token signature did not verify.
	#[error("bad token signature")]
	BadSignature,

	/// The session is past its expiry or was superseded by a newer login.
	#[error("session expired")]
	SessionExpired,

	/// The user has logged out.
	#[error("not logged in")]
	NotLoggedIn,

	// =========================================================================
	// Gate Decisions
	// =========================================================================
	/// A protected request could not be authenticated.
	#[error("unauthorized")]
	Unauthorized,

	/// The authenticated user lacks the permission for this path and mode.
	#[error("forbidden")]
	Forbidden,

	// =========================================================================
	// Infrastructure Errors
	// =========================================================================
	#[error(transparent)]
	Store(#[from] StoreError),

	/// Password hashing error.
	#[error("password hashing error: {0}")]
	Hashing(String),

	/// Token signing error.
	#[error("token signing error: {0}")]
	Token(String),

	/// Access policy could not be loaded.
	#[error(transparent)]
	Policy(#[from] PolicyError),
}

impl AuthError {
	/// Returns true if this error should be logged at error level.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			AuthError::Store(_) | AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Policy(_)
		)
	}

	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			// 400 Bad Request
			AuthError::MissingCredential
			| AuthError::WeakPassword
			| AuthError::InvalidRegistration(_) => 400,

			// 401 Unauthorized
			AuthError::InvalidCredential
			| AuthError::UserNotFound
			| AuthError::MalformedToken
			| AuthError::BadSignature
			| AuthError::SessionExpired
			| AuthError::NotLoggedIn
			| AuthError::Unauthorized => 401,

			// 403 Forbidden
			AuthError::RoleNotAssigned | AuthError::Forbidden => 403,

			// 406 Not Acceptable
			AuthError::InvalidEmail => 406,

			// 500 Internal Server Error
			AuthError::Store(_)
			| AuthError::Hashing(_)
			| AuthError::Token(_)
			| AuthError::Policy(_) => 500,
		}
	}

	/// Stable machine-readable code used in error bodies.
	pub fn error_code(&self) -> &'static str {
		match self {
			AuthError::MissingCredential => "missing_credential",
			AuthError::InvalidCredential => "invalid_credential",
			AuthError::UserNotFound => "user_not_found",
			AuthError::RoleNotAssigned => "role_not_assigned",
			AuthError::WeakPassword => "weak_password",
			AuthError::InvalidRegistration(_) => "invalid_registration",
			AuthError::InvalidEmail => "invalid_email",
			AuthError::MalformedToken => "malformed_token",
			AuthError::BadSignature => "bad_signature",
			AuthError::SessionExpired => "session_expired",
			AuthError::NotLoggedIn => "not_logged_in",
			AuthError::Unauthorized => "unauthorized",
			AuthError::Forbidden => "forbidden",
			AuthError::Store(_) => "store_error",
			AuthError::Hashing(_) => "hashing_error",
			AuthError::Token(_) => "token_error",
			AuthError::Policy(_) => "policy_error",
		}
	}
}
