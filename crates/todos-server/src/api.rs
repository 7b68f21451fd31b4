// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	http::{header, Method},
	middleware::from_fn_with_state,
	routing::{delete, get, post, put},
	Router,
};
use sqlx::sqlite::SqlitePool;
use todos_server_auth::{
	CredentialIssuer, PermissionResolver, PolicyStore, RequestGate, TokenSigner, TokenValidator,
	UserStore,
};
use todos_server_config::AuthConfig;
use todos_server_db::{TodoRepository, UserRepository};
use tower_http::cors::{Any, CorsLayer};

use crate::{auth_middleware::gate_layer, routes};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
	pub user_repo: Arc<UserRepository>,
	pub todo_repo: Arc<TodoRepository>,
	pub issuer: Arc<CredentialIssuer>,
	pub gate: Arc<RequestGate>,
}

/// Wire the auth layer to the database and the loaded policy.
pub fn create_app_state(
	pool: SqlitePool,
	policy: Arc<dyn PolicyStore>,
	auth_config: &AuthConfig,
) -> AppState {
	let user_repo = Arc::new(UserRepository::new(pool.clone()));
	let todo_repo = Arc::new(TodoRepository::new(pool));
	let store: Arc<dyn UserStore> = user_repo.clone();
	let signer = TokenSigner::new(&auth_config.signing_key);

	let issuer = Arc::new(
		CredentialIssuer::new(Arc::clone(&store), signer.clone())
			.with_session_lifetime(chrono::Duration::hours(auth_config.session_lifetime_hours)),
	);
	let validator = Arc::new(TokenValidator::new(store, signer));
	let resolver = PermissionResolver::new(policy);
	let gate = Arc::new(RequestGate::new(Arc::clone(&issuer), validator, resolver));

	AppState {
		user_repo,
		todo_repo,
		issuer,
		gate,
	}
}

/// Answers browser preflights before the gate sees them and adds the CORS
/// headers to every response, rejections included.
pub fn cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([
			Method::OPTIONS,
			Method::GET,
			Method::POST,
			Method::PUT,
			Method::PATCH,
			Method::DELETE,
		])
		.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Build the router with the gate applied to every route, the fallback included.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/register", post(routes::users::register))
		.route("/login", post(routes::users::login))
		.route("/logout", get(routes::users::logout))
		.route("/users", get(routes::users::list_users))
		.route("/user/password", put(routes::users::update_password))
		.route("/user/type", put(routes::users::update_type))
		.route(
			"/user/{id}",
			get(routes::users::get_user).delete(routes::users::delete_user),
		)
		.route("/todo", post(routes::todos::create_todo))
		.route("/todo/{id}", delete(routes::todos::delete_todo))
		.route("/todo/name/{id}", put(routes::todos::rename_todo))
		.route("/todo/description/{id}", put(routes::todos::describe_todo))
		.route("/todos", get(routes::todos::list_todos))
		.route(
			"/task/{id}",
			post(routes::todos::create_task)
				.get(routes::todos::list_tasks)
				.delete(routes::todos::delete_task),
		)
		.route("/task/name/{id}", put(routes::todos::rename_task))
		.route("/task/date/{id}", put(routes::todos::update_task_date))
		.route("/task/priority/{id}", put(routes::todos::update_task_priority))
		.route("/task/status/{id}", put(routes::todos::update_task_status))
		.route("/tasks/active/{id}", get(routes::todos::list_active_tasks))
		.route("/tasks/completed/{id}", get(routes::todos::list_completed_tasks))
		.fallback(routes::not_found)
		.layer(from_fn_with_state(state.clone(), gate_layer))
		.layer(cors_layer())
		.with_state(state)
}
