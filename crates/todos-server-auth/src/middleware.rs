// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-scope auth types and header helpers.
//!
//! This module provides:
//! - [`CurrentUser`] - the authenticated user handed to business logic
//! - [`AuthContext`] - auth state stored in request extensions
//! - [`extract_bearer_token`] / [`extract_basic_credentials`] - `Authorization` parsing
//!
//! Token and password values are never logged.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::{Mode, UserId};
use crate::user::User;

/// The currently authenticated user, with permissions resolved for this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	pub user: User,
}

impl CurrentUser {
	pub fn new(user: User) -> Self {
		Self { user }
	}

	pub fn id(&self) -> UserId {
		self.user.id
	}

	pub fn is_privileged(&self) -> bool {
		self.user.is_privileged()
	}

	/// Whether the merged permissions grant `mode` on `path`.
	pub fn can(&self, path: &str, mode: Mode) -> bool {
		self.user
			.permissions
			.get(path)
			.is_some_and(|perm| perm.allows(mode))
	}
}

/// Authentication context for request processing.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self { current_user: None }
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			current_user: Some(current_user),
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.current_user.is_some()
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// Require authentication, returning the current user or an error.
	pub fn require_user(&self) -> Result<&CurrentUser, AuthRequired> {
		self.current_user.as_ref().ok_or(AuthRequired)
	}
}

/// Error returned when authentication is required but not present.
#[derive(Debug, Clone, Copy)]
pub struct AuthRequired;

impl std::fmt::Display for AuthRequired {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "authentication required")
	}
}

impl std::error::Error for AuthRequired {}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`. An empty token counts
/// as absent.
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(str::to_string)
}

/// Extract `(username, password)` from an HTTP Basic Authorization header.
///
/// Returns `None` when the header is missing, not Basic, not valid base64 or
/// has no `:` separator.
#[instrument(level = "trace", skip_all)]
pub fn extract_basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
	let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let encoded = auth_str.strip_prefix("Basic ")?;
	let decoded = STANDARD.decode(encoded.trim()).ok()?;
	let decoded = String::from_utf8(decoded).ok()?;
	let (username, password) = decoded.split_once(':')?;
	Some((username.to_string(), password.to_string()))
}
