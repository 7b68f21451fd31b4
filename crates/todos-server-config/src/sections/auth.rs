// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.
//!
//! The signing key never comes from the TOML file. It is read from
//! `TODOS_SERVER_SIGNING_KEY` (or `TODOS_SERVER_SIGNING_KEY_FILE`) and handed
//! to [`AuthConfigLayer::finalize`] once resolved.

use std::path::PathBuf;

use serde::Deserialize;
use todos_common_config::SecretString;

const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 48;
const DEFAULT_POLICY_PATH: &str = "./conf/policy.csv";

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub environment: String,
	pub signing_key: SecretString,
	pub session_lifetime_hours: i64,
	pub policy_path: PathBuf,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment == "production"
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub session_lifetime_hours: Option<i64>,
	#[serde(default)]
	pub policy_path: Option<PathBuf>,
}

impl AuthConfigLayer {
	/// Whether the merged environment, defaults included, is `production`.
	pub fn is_production(&self) -> bool {
		self.environment.as_deref() == Some("production")
	}

	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.session_lifetime_hours.is_some() {
			self.session_lifetime_hours = other.session_lifetime_hours;
		}
		if other.policy_path.is_some() {
			self.policy_path = other.policy_path;
		}
	}

	pub fn finalize(self, signing_key: SecretString) -> AuthConfig {
		AuthConfig {
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			signing_key,
			session_lifetime_hours: self
				.session_lifetime_hours
				.unwrap_or(DEFAULT_SESSION_LIFETIME_HOURS),
			policy_path: self
				.policy_path
				.unwrap_or_else(|| PathBuf::from(DEFAULT_POLICY_PATH)),
		}
	}
}
