// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the todos server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`TODOS_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use todos_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use rand::RngCore;
use todos_common_config::{load_secret_env, SecretString};
use tracing::{debug, info, warn};

/// Environment variable holding the token signing key.
pub const SIGNING_KEY_VAR: &str = "TODOS_SERVER_SIGNING_KEY";

const MIN_PRODUCTION_KEY_LEN: usize = 32;

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`TODOS_SERVER_*`)
/// 2. Config file (`/etc/todos/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	let auth_layer = layer.auth.unwrap_or_default();
	let configured_key = load_secret_env(SIGNING_KEY_VAR)?;
	let signing_key = resolve_signing_key(auth_layer.is_production(), configured_key)?;
	let auth = auth_layer.finalize(signing_key);

	validate_config(&auth)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		environment = %auth.environment,
		session_lifetime_hours = auth.session_lifetime_hours,
		policy_path = %auth.policy_path.display(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		logging,
	})
}

/// Production requires a configured key. Elsewhere a random per-process key
/// is generated, so tokens do not survive a restart.
fn resolve_signing_key(
	production: bool,
	configured: Option<SecretString>,
) -> Result<SecretString, ConfigError> {
	match configured {
		Some(key) => Ok(key),
		None if production => Err(ConfigError::MissingSigningKey),
		None => {
			warn!(
				"{SIGNING_KEY_VAR} is not set; using an ephemeral signing key. \
				 Issued tokens will not survive a restart."
			);
			let mut bytes = [0u8; 32];
			rand::rngs::OsRng.fill_bytes(&mut bytes);
			Ok(SecretString::new(hex::encode(bytes)))
		}
	}
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig) -> Result<(), ConfigError> {
	if auth.session_lifetime_hours <= 0 {
		return Err(ConfigError::SessionLifetime(auth.session_lifetime_hours));
	}

	if auth.is_production() && auth.signing_key.expose().len() < MIN_PRODUCTION_KEY_LEN {
		return Err(ConfigError::WeakSigningKey {
			min: MIN_PRODUCTION_KEY_LEN,
		});
	}

	Ok(())
}
