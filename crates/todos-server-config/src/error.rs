// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Errors raised while resolving the server configuration.

use std::path::PathBuf;

use todos_common_config::SecretEnvError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("cannot read config file {path}: {source}")]
	ReadFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("config file {path} is not valid TOML: {source}")]
	ParseFile {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("{var}={value} is not a valid {expected}")]
	EnvValue {
		var: String,
		value: String,
		expected: &'static str,
	},

	#[error("session lifetime must be a positive number of hours, got {0}")]
	SessionLifetime(i64),

	#[error("TODOS_SERVER_SIGNING_KEY must be set when TODOS_SERVER_ENV=production")]
	MissingSigningKey,

	#[error("TODOS_SERVER_SIGNING_KEY must be at least {min} characters when TODOS_SERVER_ENV=production")]
	WeakSigningKey { min: usize },

	#[error("cannot load TODOS_SERVER_SIGNING_KEY: {0}")]
	SigningKey(#[from] SecretEnvError),
}
