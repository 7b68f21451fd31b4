// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use todos_server_auth::AuthError;
use todos_server_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Authentication or authorization failed.
	#[error(transparent)]
	Auth(#[from] AuthError),

	#[error("Database error: {0}")]
	Db(#[from] DbError),

	/// Invalid request payload.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	#[error("Not found: {0}")]
	NotFound(String),

	/// Authenticated, but the handler requires a privileged user.
	#[error("Forbidden: {0}")]
	Forbidden(String),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ServerError::Auth(e) => {
				let status =
					StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
				if e.is_internal() {
					tracing::error!(error = %e, "auth infrastructure error");
					(
						status,
						ErrorResponse::new(e.error_code(), "An internal error occurred"),
					)
				} else {
					(status, ErrorResponse::new(e.error_code(), e.to_string()))
				}
			}
			ServerError::Db(DbError::Conflict(msg)) => {
				(StatusCode::CONFLICT, ErrorResponse::new("conflict", msg.clone()))
			}
			ServerError::Db(DbError::NotFound(msg)) => {
				(StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg.clone()))
			}
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::NotFound(msg) => {
				(StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg.clone()))
			}
			ServerError::Forbidden(msg) => {
				tracing::warn!(error = %msg, "forbidden");
				(StatusCode::FORBIDDEN, ErrorResponse::new("forbidden", msg.clone()))
			}
		};

		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn auth_errors_keep_their_status() {
		let cases = [
			(AuthError::MissingCredential, StatusCode::BAD_REQUEST),
			(AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
			(AuthError::Forbidden, StatusCode::FORBIDDEN),
			(AuthError::InvalidEmail, StatusCode::NOT_ACCEPTABLE),
			(
				AuthError::Hashing("boom".to_string()),
				StatusCode::INTERNAL_SERVER_ERROR,
			),
		];

		for (err, expected) in cases {
			let response = ServerError::from(err).into_response();
			assert_eq!(response.status(), expected);
		}
	}

	#[test]
	fn db_conflict_is_409() {
		let response = ServerError::from(DbError::Conflict("taken".to_string())).into_response();
		assert_eq!(response.status(), StatusCode::CONFLICT);
	}

	#[test]
	fn db_internal_is_500() {
		let response = ServerError::from(DbError::Internal("bad".to_string())).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
