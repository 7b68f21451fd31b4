// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User account routes.
//!
//! The gate has already authenticated the caller and checked the path and
//! mode by the time these run. Handlers only add the ownership and
//! privilege checks the policy file cannot express.

use axum::{
	extract::{rejection::JsonRejection, Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use serde::Deserialize;
use todos_server_auth::{hash_password, validate_registration, NewUser, User, UserId};

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
	pub username: String,
	pub password: String,
	pub email: String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
	pub oldpass: String,
	pub newpass: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTypeRequest {
	pub id: UserId,
	#[serde(rename = "type")]
	pub role: String,
}

/// Account view for read routes: no password hash, no session token.
fn account_view(mut user: User) -> User {
	user.token.clear();
	user.scrubbed()
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
	payload
		.map(|Json(body)| body)
		.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

/// POST /register
#[tracing::instrument(skip_all)]
pub async fn register(
	State(state): State<AppState>,
	payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;
	validate_registration(&body.username, &body.password, &body.email)?;

	let password_hash = hash_password(&body.password)?;
	let new_user = NewUser::new(body.username, body.email, body.first_name, body.last_name);
	let id = state.user_repo.create_user(&new_user, &password_hash).await?;

	tracing::info!(user_id = id, username = %new_user.username, "user registered");
	Ok((StatusCode::OK, Json("Successfully registered")))
}

/// POST /login
///
/// The gate has already verified the Basic credentials and started the
/// session; this returns the user with the new token and its permissions.
#[tracing::instrument(skip_all, fields(user_id = %current_user.id()))]
pub async fn login(RequireAuth(current_user): RequireAuth) -> impl IntoResponse {
	(StatusCode::ACCEPTED, Json(current_user.user))
}

/// GET /logout
pub async fn logout() -> impl IntoResponse {
	(StatusCode::OK, Json("Logged out"))
}

/// GET /users
///
/// Every user except the caller. Privileged users only.
#[tracing::instrument(skip_all, fields(actor_id = %current_user.id()))]
pub async fn list_users(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	if !current_user.is_privileged() {
		return Err(ServerError::Forbidden(
			"You are not allowed to list users".to_string(),
		));
	}

	let users = state.user_repo.list_users(current_user.id()).await?;
	let users: Vec<_> = users.into_iter().map(account_view).collect();

	tracing::info!(user_count = users.len(), "listed users");
	Ok(Json(users))
}

/// GET /user/{id}
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn get_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<UserId>,
) -> Result<impl IntoResponse, ServerError> {
	if id != current_user.id() && !current_user.is_privileged() {
		return Err(ServerError::Forbidden(
			"You are not allowed to see this user".to_string(),
		));
	}

	let user = state
		.user_repo
		.get_user_by_id(id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("user {id}")))?;

	Ok(Json(account_view(user)))
}

/// DELETE /user/{id}
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn delete_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<UserId>,
) -> Result<impl IntoResponse, ServerError> {
	if !current_user.is_privileged() {
		return Err(ServerError::Forbidden(
			"You are not allowed to delete users".to_string(),
		));
	}

	if !state.user_repo.delete_user(id).await? {
		return Err(ServerError::NotFound(format!("user {id}")));
	}

	tracing::info!(user_id = id, "user deleted");
	Ok(Json("User deleted"))
}

/// PUT /user/password
#[tracing::instrument(skip_all, fields(actor_id = %current_user.id()))]
pub async fn update_password(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;

	state
		.issuer
		.change_password(&current_user.user.username, &body.oldpass, &body.newpass)
		.await?;

	Ok((StatusCode::ACCEPTED, Json("Password successfully changed")))
}

/// PUT /user/type
///
/// Changes another user's role-name. Privileged users only.
#[tracing::instrument(skip_all, fields(actor_id = %current_user.id()))]
pub async fn update_type(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<UpdateTypeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	if !current_user.is_privileged() {
		return Err(ServerError::Forbidden(
			"You have no permission to update user type".to_string(),
		));
	}

	let body = parse_body(payload)?;
	let role = body.role.trim();
	if role.is_empty() {
		return Err(ServerError::BadRequest("type must not be empty".to_string()));
	}

	state.user_repo.update_role(body.id, role).await?;
	Ok(Json("User updated"))
}
