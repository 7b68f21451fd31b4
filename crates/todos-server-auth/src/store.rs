// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator traits the auth layer depends on.
//!
//! - [`UserStore`] - user lookup and session persistence (async, database backed)
//! - [`PolicyStore`] - access rules per subject (sync, loaded once at startup)

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{AccessRule, Subject, UserId};
use crate::user::User;

#[async_trait]
pub trait UserStore: Send + Sync {
	/// Look up a user by email when `identifier` contains `@`, otherwise by
	/// username.
	async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError>;

	async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

	/// Record a new session (token and expiry in epoch seconds) on the user.
	async fn persist_session(
		&self,
		username: &str,
		token: &str,
		expires_at: i64,
	) -> Result<(), StoreError>;

	/// Reset token to empty and expiry to 0.
	async fn clear_session(&self, username: &str) -> Result<(), StoreError>;

	async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), StoreError>;
}

/// Read-only source of access rules.
pub trait PolicyStore: Send + Sync {
	fn rules_for_subject(&self, subject: &Subject) -> Vec<AccessRule>;
}
