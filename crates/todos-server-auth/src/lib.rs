// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and path-based access control for the todos server.
//!
//! This crate provides:
//! - [`CredentialIssuer`] - password login, session tokens, password changes
//! - [`TokenValidator`] - bearer token → user, with session liveness checks
//! - [`PermissionResolver`] - role and identity rules merged per request
//! - [`RequestGate`] - the single decision point every request passes through
//! - [`PolicySet`] - rules loaded once from a casbin-style CSV file
//!
//! Storage is reached only through [`UserStore`] and [`PolicyStore`].
//!
//! # Security Considerations
//!
//! - Passwords are stored as Argon2id hashes and never serialized
//! - Tokens are HS256 JWTs; other algorithms are rejected
//! - The signing key is injected as a [`todos_common_config::SecretString`]

mod argon2_config;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod policy;
pub mod store;
pub mod token;
pub mod types;
pub mod user;
pub mod validator;

#[cfg(test)]
mod testing;

pub use error::{AuthError, StoreError};
pub use gate::{resource_path, Endpoint, GateDecision, RequestGate};
pub use issuer::{CredentialIssuer, MIN_NEW_PASSWORD_LEN};
pub use middleware::{
	extract_basic_credentials, extract_bearer_token, AuthContext, AuthRequired, CurrentUser,
};
pub use password::{hash_password, verify_password};
pub use permissions::{merge_rules, PermissionResolver};
pub use policy::{PolicyError, PolicySet};
pub use store::{PolicyStore, UserStore};
pub use token::{hash_token, Claims, TokenSigner};
pub use types::{
	AccessRule, Mode, PathPermission, Permissions, Subject, UserId, ADMIN_ROLE, DEFAULT_ROLE,
	PROTECTED_RESOURCES, SESSION_LIFETIME_HOURS,
};
pub use user::{
	is_email_identifier, is_valid_email, validate_registration, NewUser, User, MIN_REGISTRATION_LEN,
};
pub use validator::TokenValidator;
