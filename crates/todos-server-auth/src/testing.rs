// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::password::hash_password;
use crate::store::UserStore;
use crate::types::{Permissions, UserId};
use crate::user::{is_email_identifier, User};

/// HashMap-backed [`UserStore`] that counts writes and can be told to fail.
#[derive(Default)]
pub struct MemoryUserStore {
	users: Mutex<HashMap<String, User>>,
	writes: AtomicUsize,
	fail: AtomicBool,
}

impl MemoryUserStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a user with a real Argon2 hash of `password`.
	pub fn with_user(self, id: UserId, username: &str, email: &str, role: &str, password: &str) -> Self {
		let user = User {
			id,
			role: role.to_string(),
			username: username.to_string(),
			first_name: String::new(),
			last_name: String::new(),
			email: email.to_string(),
			password_hash: hash_password(password).unwrap(),
			token: String::new(),
			session_expires_at: 0,
			permissions: Permissions::new(),
		};
		self.users.lock().unwrap().insert(username.to_string(), user);
		self
	}

	pub fn user(&self, username: &str) -> Option<User> {
		self.users.lock().unwrap().get(username).cloned()
	}

	/// Overwrite a stored user directly, bypassing the write counter.
	pub fn put(&self, user: User) {
		self.users.lock().unwrap().insert(user.username.clone(), user);
	}

	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	pub fn set_failing(&self, fail: bool) {
		self.fail.store(fail, Ordering::SeqCst);
	}

	fn check(&self) -> Result<(), StoreError> {
		if self.fail.load(Ordering::SeqCst) {
			return Err(StoreError::new("store unavailable"));
		}
		Ok(())
	}

	fn write(&self, username: &str, f: impl FnOnce(&mut User)) -> Result<(), StoreError> {
		self.check()?;
		self.writes.fetch_add(1, Ordering::SeqCst);
		if let Some(user) = self.users.lock().unwrap().get_mut(username) {
			f(user);
		}
		Ok(())
	}
}

#[async_trait]
impl UserStore for MemoryUserStore {
	async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
		self.check()?;
		let users = self.users.lock().unwrap();
		Ok(users
			.values()
			.find(|u| {
				if is_email_identifier(identifier) {
					u.email == identifier
				} else {
					u.username == identifier
				}
			})
			.cloned())
	}

	async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
		self.check()?;
		let users = self.users.lock().unwrap();
		Ok(users.values().find(|u| u.id == id).cloned())
	}

	async fn persist_session(
		&self,
		username: &str,
		token: &str,
		expires_at: i64,
	) -> Result<(), StoreError> {
		self.write(username, |user| {
			user.token = token.to_string();
			user.session_expires_at = expires_at;
		})
	}

	async fn clear_session(&self, username: &str) -> Result<(), StoreError> {
		self.write(username, |user| {
			user.token.clear();
			user.session_expires_at = 0;
		})
	}

	async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
		self.write(username, |user| {
			user.password_hash = password_hash.to_string();
		})
	}
}
