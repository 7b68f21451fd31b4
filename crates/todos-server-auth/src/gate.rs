// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The request gate: one authentication and authorization decision per request.
//!
//! # Request Flow
//!
//! ```text
//! Request → classify first path segment
//!              │
//!              ├── POST register → Public
//!              ├── POST login    → Basic credentials → Issuer → LoggedIn(user + token)
//!              ├── logout        → best-effort Validator → clear session → LoggedOut
//!              └── anything else → Validator → Resolver → path/mode check → Authorized(user)
//! ```
//!
//! Only paths in [`PROTECTED_RESOURCES`] are checked against permissions. Any
//! other path is allowed once the caller is authenticated.

use std::sync::Arc;

use http::{HeaderMap, Method, Uri};
use tracing::instrument;

use crate::error::AuthError;
use crate::issuer::CredentialIssuer;
use crate::middleware::{extract_basic_credentials, extract_bearer_token, CurrentUser};
use crate::permissions::PermissionResolver;
use crate::types::{Mode, PROTECTED_RESOURCES};
use crate::user::User;
use crate::validator::TokenValidator;

/// Which branch of the gate a request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
	Public,
	Login,
	Logout,
	Protected,
}

impl Endpoint {
	/// Classify by exact match on the first path segment.
	pub fn classify(method: &Method, path: &str) -> Self {
		match first_segment(path) {
			"register" if method == Method::POST => Endpoint::Public,
			"login" if method == Method::POST => Endpoint::Login,
			"logout" => Endpoint::Logout,
			_ => Endpoint::Protected,
		}
	}
}

/// Outcome of a request that passed the gate.
#[derive(Debug, Clone)]
pub enum GateDecision {
	/// Registration, no authentication attempted.
	Public,
	/// Credentials accepted; the user carries the new token and permissions.
	LoggedIn(CurrentUser),
	/// Any session named by the presented token has been cleared.
	LoggedOut,
	/// Authenticated and allowed for this path and mode.
	Authorized(CurrentUser),
}

impl GateDecision {
	pub fn current_user(&self) -> Option<&CurrentUser> {
		match self {
			GateDecision::LoggedIn(user) | GateDecision::Authorized(user) => Some(user),
			GateDecision::Public | GateDecision::LoggedOut => None,
		}
	}
}

fn first_segment(path: &str) -> &str {
	path.trim_start_matches('/').split('/').next().unwrap_or("")
}

/// Reduce a request target to its resource path.
///
/// Drops the query string and anything after the last `.`, then keeps the
/// first segment: `/task/42?x=1` → `/task`, `/tasks/active/7` → `/tasks`,
/// `/` → `/`.
pub fn resource_path(target: &str) -> String {
	let without_query = target.split('?').next().unwrap_or("");
	let without_suffix = match without_query.rfind('.') {
		Some(idx) => &without_query[..idx],
		None => without_query,
	};
	let segment = without_suffix.split('/').nth(1).unwrap_or("");
	format!("/{segment}")
}

pub struct RequestGate {
	issuer: Arc<CredentialIssuer>,
	validator: Arc<TokenValidator>,
	resolver: PermissionResolver,
}

impl RequestGate {
	pub fn new(
		issuer: Arc<CredentialIssuer>,
		validator: Arc<TokenValidator>,
		resolver: PermissionResolver,
	) -> Self {
		Self {
			issuer,
			validator,
			resolver,
		}
	}

	/// Decide whether a request may proceed.
	///
	/// # Errors
	/// - Login: the issuer's error, or [`AuthError::MissingCredential`].
	/// - Protected: [`AuthError::Unauthorized`] or [`AuthError::Forbidden`].
	/// - Any branch: [`AuthError::Store`] when the store fails.
	#[instrument(skip_all, fields(method = %method, path = %uri.path()))]
	pub async fn authorize(
		&self,
		method: &Method,
		uri: &Uri,
		headers: &HeaderMap,
	) -> Result<GateDecision, AuthError> {
		match Endpoint::classify(method, uri.path()) {
			Endpoint::Public => Ok(GateDecision::Public),
			Endpoint::Login => self.login(headers).await,
			Endpoint::Logout => self.logout(headers).await,
			Endpoint::Protected => self.protected(method, uri, headers).await,
		}
	}

	async fn login(&self, headers: &HeaderMap) -> Result<GateDecision, AuthError> {
		let (identifier, password) =
			extract_basic_credentials(headers).ok_or(AuthError::MissingCredential)?;

		let (user, _token) = self.issuer.issue(&identifier, &password).await?;
		Ok(GateDecision::LoggedIn(self.with_permissions(user)))
	}

	async fn logout(&self, headers: &HeaderMap) -> Result<GateDecision, AuthError> {
		let Some(token) = extract_bearer_token(headers) else {
			return Ok(GateDecision::LoggedOut);
		};

		let username = match self.validator.validate(&token).await {
			Ok(user) => Some(user.username),
			Err(err @ AuthError::Store(_)) => return Err(err),
			Err(err) => {
				tracing::debug!(error = %err, "logout with invalid session");
				self.validator
					.verify_signature(&token)
					.ok()
					.map(|claims| claims.sub)
			}
		};

		if let Some(username) = username {
			self.issuer.revoke(&username).await?;
		}

		Ok(GateDecision::LoggedOut)
	}

	async fn protected(
		&self,
		method: &Method,
		uri: &Uri,
		headers: &HeaderMap,
	) -> Result<GateDecision, AuthError> {
		let token = extract_bearer_token(headers).ok_or(AuthError::Unauthorized)?;

		let user = match self.validator.validate(&token).await {
			Ok(user) => user,
			Err(err @ AuthError::Store(_)) => return Err(err),
			Err(err) => {
				tracing::debug!(error = %err, "rejected token");
				return Err(AuthError::Unauthorized);
			}
		};

		let current = self.with_permissions(user);
		let target = uri
			.path_and_query()
			.map(|pq| pq.as_str())
			.unwrap_or_else(|| uri.path());
		let resource = resource_path(target);
		let mode = Mode::from_method(method);

		if PROTECTED_RESOURCES.contains(&resource.as_str()) {
			self.enforce(&current, &resource, mode)?;
		}

		Ok(GateDecision::Authorized(current))
	}

	fn enforce(&self, current: &CurrentUser, resource: &str, mode: Mode) -> Result<(), AuthError> {
		if current.can(resource, mode) {
			return Ok(());
		}

		if self.resolver.role_grants(&current.user.role, resource, mode) {
			return Ok(());
		}

		tracing::info!(
			user_id = current.id(),
			resource = %resource,
			mode = %mode,
			"access forbidden"
		);
		Err(AuthError::Forbidden)
	}

	fn with_permissions(&self, mut user: User) -> CurrentUser {
		user.permissions = self.resolver.resolve(&user.role, &user.email);
		CurrentUser::new(user)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::PolicySet;
	use crate::testing::MemoryUserStore;
	use crate::token::TokenSigner;
	use base64::engine::general_purpose::STANDARD;
	use base64::Engine;
	use chrono::{Duration, Utc};
	use http::header::AUTHORIZATION;
	use http::HeaderValue;

	const KEY: &[u8] = b"gate-test";

	const POLICY: &str = "\
p, user, /todo, write
p, user, /todos, read
p, admin, /users, read
p, admin, /user, write
p, bob@example.com, /tasks, read
";

	struct Fixture {
		store: Arc<MemoryUserStore>,
		gate: RequestGate,
	}

	fn fixture() -> Fixture {
		let store = Arc::new(
			MemoryUserStore::new()
				.with_user(1, "alice", "a@b.com", "user", "wonderland")
				.with_user(2, "bob", "bob@example.com", "user", "builder")
				.with_user(3, "root", "root@example.com", "admin", "toor"),
		);
		let issuer = Arc::new(CredentialIssuer::new(store.clone(), TokenSigner::from_bytes(KEY)));
		let validator = Arc::new(TokenValidator::new(store.clone(), TokenSigner::from_bytes(KEY)));
		let policy = Arc::new(PolicySet::from_csv_str(POLICY).unwrap());
		let gate = RequestGate::new(issuer, validator, PermissionResolver::new(policy));
		Fixture { store, gate }
	}

	fn basic(username: &str, password: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		let encoded = STANDARD.encode(format!("{username}:{password}"));
		headers.insert(
			AUTHORIZATION,
			HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
		);
		headers
	}

	fn bearer(token: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(
			AUTHORIZATION,
			HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
		);
		headers
	}

	async fn login(fx: &Fixture, username: &str, password: &str) -> String {
		let uri: Uri = "/login".parse().unwrap();
		match fx
			.gate
			.authorize(&Method::POST, &uri, &basic(username, password))
			.await
			.unwrap()
		{
			GateDecision::LoggedIn(current) => current.user.token,
			other => panic!("expected login, got {other:?}"),
		}
	}

	async fn request(fx: &Fixture, method: Method, target: &str, token: &str) -> Result<GateDecision, AuthError> {
		let uri: Uri = target.parse().unwrap();
		fx.gate.authorize(&method, &uri, &bearer(token)).await
	}

	mod derivation {
		use super::*;

		#[test]
		fn resource_path_takes_first_segment() {
			assert_eq!(resource_path("/task/42?x=1"), "/task");
			assert_eq!(resource_path("/tasks/active/7"), "/tasks");
			assert_eq!(resource_path("/"), "/");
			assert_eq!(resource_path("/todos"), "/todos");
		}

		#[test]
		fn resource_path_strips_suffix_after_last_dot() {
			assert_eq!(resource_path("/todos.json"), "/todos");
			assert_eq!(resource_path("/user/3.xml?pretty=1"), "/user");
		}

		#[test]
		fn classify_matches_first_segment_exactly() {
			assert_eq!(Endpoint::classify(&Method::POST, "/register"), Endpoint::Public);
			assert_eq!(Endpoint::classify(&Method::GET, "/register"), Endpoint::Protected);
			assert_eq!(Endpoint::classify(&Method::POST, "/login"), Endpoint::Login);
			assert_eq!(Endpoint::classify(&Method::GET, "/login"), Endpoint::Protected);
			assert_eq!(Endpoint::classify(&Method::GET, "/logout"), Endpoint::Logout);
			assert_eq!(Endpoint::classify(&Method::GET, "/todos/login"), Endpoint::Protected);
			assert_eq!(Endpoint::classify(&Method::GET, "/loginx"), Endpoint::Protected);
		}
	}

	mod public {
		use super::*;

		#[tokio::test]
		async fn register_passes_without_credentials() {
			let fx = fixture();
			let uri: Uri = "/register".parse().unwrap();

			let decision = fx
				.gate
				.authorize(&Method::POST, &uri, &HeaderMap::new())
				.await
				.unwrap();
			assert!(matches!(decision, GateDecision::Public));
		}
	}

	mod login {
		use super::*;

		#[tokio::test]
		async fn attaches_user_with_token_and_permissions() {
			let fx = fixture();
			let uri: Uri = "/login".parse().unwrap();

			let decision = fx
				.gate
				.authorize(&Method::POST, &uri, &basic("alice", "wonderland"))
				.await
				.unwrap();

			let GateDecision::LoggedIn(current) = decision else {
				panic!("expected LoggedIn");
			};
			assert!(!current.user.token.is_empty());
			assert!(current.can("/todo", Mode::Write));
			assert_eq!(fx.store.writes(), 1);
		}

		#[tokio::test]
		async fn missing_basic_header_is_missing_credential() {
			let fx = fixture();
			let uri: Uri = "/login".parse().unwrap();

			let err = fx
				.gate
				.authorize(&Method::POST, &uri, &HeaderMap::new())
				.await
				.unwrap_err();
			assert!(matches!(err, AuthError::MissingCredential));
		}

		#[tokio::test]
		async fn get_with_basic_credentials_starts_no_session() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;
			let writes = fx.store.writes();
			let uri: Uri = "/login".parse().unwrap();

			let err = fx
				.gate
				.authorize(&Method::GET, &uri, &basic("alice", "wonderland"))
				.await
				.unwrap_err();

			assert!(matches!(err, AuthError::Unauthorized));
			assert_eq!(fx.store.writes(), writes);
			assert_eq!(fx.store.user("alice").unwrap().token, token);
		}

		#[tokio::test]
		async fn wrong_password_is_issuer_error() {
			let fx = fixture();
			let uri: Uri = "/login".parse().unwrap();

			let err = fx
				.gate
				.authorize(&Method::POST, &uri, &basic("alice", "nope"))
				.await
				.unwrap_err();
			assert!(matches!(err, AuthError::InvalidCredential));
			assert_eq!(fx.store.writes(), 0);
		}
	}

	mod logout {
		use super::*;

		#[tokio::test]
		async fn clears_session_and_token_stops_working() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;

			let decision = request(&fx, Method::GET, "/logout", &token).await.unwrap();
			assert!(matches!(decision, GateDecision::LoggedOut));

			let stored = fx.store.user("alice").unwrap();
			assert!(stored.token.is_empty());
			assert_eq!(stored.session_expires_at, 0);

			let err = request(&fx, Method::GET, "/todos", &token).await.unwrap_err();
			assert!(matches!(err, AuthError::Unauthorized));
		}

		#[tokio::test]
		async fn expired_session_is_still_cleared() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;

			let mut stored = fx.store.user("alice").unwrap();
			stored.session_expires_at = (Utc::now() - Duration::hours(1)).timestamp();
			fx.store.put(stored);

			request(&fx, Method::GET, "/logout", &token).await.unwrap();

			let stored = fx.store.user("alice").unwrap();
			assert!(stored.token.is_empty());
			assert_eq!(stored.session_expires_at, 0);
		}

		#[tokio::test]
		async fn unverifiable_token_clears_nothing() {
			let fx = fixture();
			login(&fx, "alice", "wonderland").await;
			let writes = fx.store.writes();

			let forged = TokenSigner::from_bytes(b"forged")
				.mint("alice", Utc::now() + Duration::hours(1))
				.unwrap();
			let decision = request(&fx, Method::GET, "/logout", &forged).await.unwrap();

			assert!(matches!(decision, GateDecision::LoggedOut));
			assert_eq!(fx.store.writes(), writes);
			assert!(!fx.store.user("alice").unwrap().token.is_empty());
		}

		#[tokio::test]
		async fn no_token_is_accepted() {
			let fx = fixture();
			let uri: Uri = "/logout".parse().unwrap();

			let decision = fx
				.gate
				.authorize(&Method::GET, &uri, &HeaderMap::new())
				.await
				.unwrap();
			assert!(matches!(decision, GateDecision::LoggedOut));
		}

		#[tokio::test]
		async fn store_failure_surfaces() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;
			fx.store.set_failing(true);

			let err = request(&fx, Method::GET, "/logout", &token).await.unwrap_err();
			assert!(matches!(err, AuthError::Store(_)));
		}
	}

	mod protected {
		use super::*;

		#[tokio::test]
		async fn role_rule_allows_write() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;

			let decision = request(&fx, Method::POST, "/todo", &token).await.unwrap();
			let current = decision.current_user().unwrap();
			assert_eq!(current.user.username, "alice");
			assert!(current.user.permissions.contains_key("/todo"));
		}

		#[tokio::test]
		async fn missing_mode_is_forbidden() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;

			let err = request(&fx, Method::DELETE, "/user/3", &token).await.unwrap_err();
			assert!(matches!(err, AuthError::Forbidden));

			let err = request(&fx, Method::GET, "/todo/1", &token).await.unwrap_err();
			assert!(matches!(err, AuthError::Forbidden));
		}

		#[tokio::test]
		async fn identity_rule_adds_access() {
			let fx = fixture();
			let alice = login(&fx, "alice", "wonderland").await;
			let bob = login(&fx, "bob", "builder").await;

			assert!(matches!(
				request(&fx, Method::GET, "/tasks?done=1", &alice).await,
				Err(AuthError::Forbidden)
			));
			assert!(request(&fx, Method::GET, "/tasks?done=1", &bob).await.is_ok());
		}

		#[tokio::test]
		async fn admin_has_no_implicit_bypass() {
			let fx = fixture();
			let token = login(&fx, "root", "toor").await;

			assert!(request(&fx, Method::GET, "/users", &token).await.is_ok());
			assert!(matches!(
				request(&fx, Method::POST, "/todo", &token).await,
				Err(AuthError::Forbidden)
			));
		}

		#[tokio::test]
		async fn unlisted_path_passes_once_authenticated() {
			let fx = fixture();
			let token = login(&fx, "alice", "wonderland").await;

			assert!(request(&fx, Method::DELETE, "/reports/1", &token).await.is_ok());
			assert!(request(&fx, Method::GET, "/", &token).await.is_ok());
		}

		#[tokio::test]
		async fn missing_token_is_unauthorized() {
			let fx = fixture();
			let uri: Uri = "/todos".parse().unwrap();

			let err = fx
				.gate
				.authorize(&Method::GET, &uri, &HeaderMap::new())
				.await
				.unwrap_err();
			assert!(matches!(err, AuthError::Unauthorized));
		}

		#[tokio::test]
		async fn invalid_token_is_unauthorized() {
			let fx = fixture();

			let err = request(&fx, Method::GET, "/reports", "garbage").await.unwrap_err();
			assert!(matches!(err, AuthError::Unauthorized));
		}
	}
}
