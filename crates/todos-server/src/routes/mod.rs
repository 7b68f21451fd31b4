// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod todos;
pub mod users;

use axum::response::IntoResponse;

use crate::error::ServerError;

/// Fallback for paths with no handler. Runs after the gate, so an unknown
/// protected path still answers 401 or 403 first.
pub async fn not_found(uri: axum::http::Uri) -> impl IntoResponse {
	ServerError::NotFound(uri.path().to_string())
}
