// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Gate middleware and auth extractors for Axum.
//!
//! [`gate_layer`] runs the [`todos_server_auth::RequestGate`] for every request.
//! A rejected request never reaches a handler. An accepted one carries an
//! [`AuthContext`] in its extensions, which handlers read with [`RequireAuth`].
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/users", get(list_users))
//!     .layer(from_fn_with_state(state.clone(), gate_layer));
//! ```

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use todos_server_auth::{AuthContext, AuthError, CurrentUser};
use tracing::instrument;

use crate::{api::AppState, error::ServerError};

#[instrument(
	name = "gate_layer",
	skip_all,
	fields(user_id = tracing::field::Empty)
)]
pub async fn gate_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let decision = state
		.gate
		.authorize(request.method(), request.uri(), request.headers())
		.await;

	let auth_ctx = match decision {
		Ok(decision) => match decision.current_user() {
			Some(user) => {
				tracing::Span::current().record("user_id", user.id());
				AuthContext::authenticated(user.clone())
			}
			None => AuthContext::unauthenticated(),
		},
		Err(e) => {
			if !e.is_internal() {
				tracing::debug!(error = %e, "request rejected by gate");
			}
			return ServerError::from(e).into_response();
		}
	};

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

/// Extractor for the user the gate authenticated.
///
/// Rejects with 401 when the request carries no authenticated user, e.g. a
/// handler mounted on a route the gate treats as public.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = Response;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		match auth_ctx.current_user {
			Some(user) => Ok(RequireAuth(user)),
			None => {
				tracing::debug!("Authentication required: no authenticated user");
				Err(ServerError::from(AuthError::Unauthorized).into_response())
			}
		}
	}
}
