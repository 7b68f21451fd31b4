// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The todos HTTP server.
//!
//! Every request passes the [`todos_server_auth::RequestGate`] through
//! [`auth_middleware::gate_layer`] before reaching a handler. Handlers read the
//! authenticated user from the request's [`todos_server_auth::AuthContext`].

pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod logging;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use error::{ErrorResponse, ServerError};
pub use logging::LogFilter;
pub use todos_server_config::ServerConfig;
