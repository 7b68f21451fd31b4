// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared setup for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	body::Body,
	http::{header::AUTHORIZATION, Method, Request, StatusCode},
	Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use todos_common_config::SecretString;
use todos_server::{create_app_state, create_router, AppState};
use todos_server_auth::PolicySet;
use todos_server_config::AuthConfigLayer;
use tower::ServiceExt;

pub const PASSWORD: &str = "hunter22";

const POLICY: &str = "
p, user, /user, read
p, user, /user, write
p, user, /todo, read
p, user, /todo, write
p, user, /todos, read
p, user, /task, read
p, user, /task, write
p, user, /tasks, read
p, admin, /users, read
p, admin, /user, read
p, admin, /user, write
p, admin, /todo, read
p, admin, /todo, write
p, admin, /todos, read
p, admin, /task, read
p, admin, /task, write
p, admin, /tasks, read
";

pub async fn setup_test_app() -> (Router, AppState) {
	let pool = todos_server_db::testing::create_migrated_test_pool().await;
	let policy = PolicySet::from_csv_str(POLICY).unwrap();
	let auth_config =
		AuthConfigLayer::default().finalize(SecretString::new("integration-test-key".to_string()));
	let state = create_app_state(pool, Arc::new(policy), &auth_config);
	(create_router(state.clone()), state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let body = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap()
	};
	(status, body)
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
	let mut builder = Request::builder()
		.method(method)
		.uri(uri)
		.header("content-type", "application/json");
	if let Some(token) = token {
		builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
	}
	builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bearer_request(method: Method, uri: &str, token: &str) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.body(Body::empty())
		.unwrap()
}

pub async fn register(app: &Router, username: &str, password: &str, email: &str) -> StatusCode {
	let request = json_request(
		Method::POST,
		"/register",
		None,
		json!({ "username": username, "password": password, "email": email }),
	);
	send(app, request).await.0
}

pub async fn login(app: &Router, identifier: &str, password: &str) -> (StatusCode, Value) {
	let credentials = STANDARD.encode(format!("{identifier}:{password}"));
	let request = Request::builder()
		.method(Method::POST)
		.uri("/login")
		.header(AUTHORIZATION, format!("Basic {credentials}"))
		.body(Body::empty())
		.unwrap();
	send(app, request).await
}

/// Register and log in, returning `(user id, token)`.
pub async fn signed_in(app: &Router, username: &str) -> (i64, String) {
	let email = format!("{username}@example.com");
	assert_eq!(register(app, username, PASSWORD, &email).await, StatusCode::OK);
	let (status, body) = login(app, username, PASSWORD).await;
	assert_eq!(status, StatusCode::ACCEPTED);
	(
		body["id"].as_i64().unwrap(),
		body["token"].as_str().unwrap().to_string(),
	)
}

pub async fn signed_in_admin(app: &Router, state: &AppState, username: &str) -> (i64, String) {
	let email = format!("{username}@example.com");
	assert_eq!(register(app, username, PASSWORD, &email).await, StatusCode::OK);
	let user = state
		.user_repo
		.get_user_by_identifier(username)
		.await
		.unwrap()
		.unwrap();
	state.user_repo.update_role(user.id, "admin").await.unwrap();
	let (status, body) = login(app, username, PASSWORD).await;
	assert_eq!(status, StatusCode::ACCEPTED);
	(user.id, body["token"].as_str().unwrap().to_string())
}
