// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! Holds accounts together with their current session (token and expiry).
//! Implements [`todos_server_auth::UserStore`] for the auth layer and exposes
//! the administrative operations the HTTP routes need.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use todos_server_auth::{
	is_email_identifier, NewUser, Permissions, StoreError, User, UserId, UserStore,
};

use crate::error::{is_unique_constraint_error, DbError};

const USER_COLUMNS: &str = "id, role, username, first_name, last_name, email, password_hash, \
	token, session_expires_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given connection pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new account and return its generated ID.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the username or email is taken.
	#[tracing::instrument(skip(self, user, password_hash), fields(username = %user.username))]
	pub async fn create_user(&self, user: &NewUser, password_hash: &str) -> Result<UserId, DbError> {
		let result = sqlx::query(
			r#"
			INSERT INTO users (role, username, first_name, last_name, email, password_hash)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&user.role)
		.bind(&user.username)
		.bind(&user.first_name)
		.bind(&user.last_name)
		.bind(&user.email)
		.bind(password_hash)
		.execute(&self.pool)
		.await;

		match result {
			Ok(done) => {
				let id = done.last_insert_rowid();
				tracing::debug!(user_id = id, "user created");
				Ok(id)
			}
			Err(e) if is_unique_constraint_error(&e) => Err(DbError::Conflict(
				"username or email already registered".to_string(),
			)),
			Err(e) => Err(e.into()),
		}
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|r| row_to_user(&r)))
	}

	/// Look up by email if the identifier contains `@`, by username otherwise.
	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, DbError> {
		let column = if is_email_identifier(identifier) {
			"email"
		} else {
			"username"
		};
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"
		))
		.bind(identifier)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| row_to_user(&r)))
	}

	/// All users except `exclude`, ordered by ID.
	#[tracing::instrument(skip(self))]
	pub async fn list_users(&self, exclude: UserId) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE id != ? ORDER BY id"
		))
		.bind(exclude)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(row_to_user).collect())
	}

	/// Delete a user with their to-do lists and tasks. Returns true if the
	/// user existed.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn delete_user(&self, id: UserId) -> Result<bool, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM tasks WHERE todo_id IN (SELECT id FROM todos WHERE user_id = ?)")
			.bind(id)
			.execute(&mut *tx)
			.await?;
		sqlx::query("DELETE FROM todos WHERE user_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(result.rows_affected() > 0)
	}

	/// # Errors
	/// Returns `DbError::NotFound` if no user has this ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn update_role(&self, id: UserId, role: &str) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
			.bind(role)
			.bind(id)
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {id}")));
		}

		tracing::info!(user_id = id, role = %role, "user role updated");
		Ok(())
	}

	#[tracing::instrument(skip(self, token))]
	pub async fn set_session(&self, username: &str, token: &str, expires_at: i64) -> Result<(), DbError> {
		sqlx::query("UPDATE users SET token = ?, session_expires_at = ? WHERE username = ?")
			.bind(token)
			.bind(expires_at)
			.bind(username)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn clear_session(&self, username: &str) -> Result<(), DbError> {
		sqlx::query("UPDATE users SET token = '', session_expires_at = 0 WHERE username = ?")
			.bind(username)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self, password_hash))]
	pub async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), DbError> {
		sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
			.bind(password_hash)
			.bind(username)
			.execute(&self.pool)
			.await?;
		Ok(())
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
	User {
		id: row.get("id"),
		role: row.get("role"),
		username: row.get("username"),
		first_name: row.get("first_name"),
		last_name: row.get("last_name"),
		email: row.get("email"),
		password_hash: row.get("password_hash"),
		token: row.get("token"),
		session_expires_at: row.get("session_expires_at"),
		permissions: Permissions::new(),
	}
}

#[async_trait]
impl UserStore for UserRepository {
	async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
		Ok(self.get_user_by_identifier(identifier).await?)
	}

	async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
		Ok(self.get_user_by_id(id).await?)
	}

	async fn persist_session(
		&self,
		username: &str,
		token: &str,
		expires_at: i64,
	) -> Result<(), StoreError> {
		Ok(self.set_session(username, token, expires_at).await?)
	}

	async fn clear_session(&self, username: &str) -> Result<(), StoreError> {
		Ok(UserRepository::clear_session(self, username).await?)
	}

	async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
		Ok(UserRepository::update_password(self, username, password_hash).await?)
	}
}
