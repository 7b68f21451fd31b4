// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing filter that can be installed before configuration is loaded.
//!
//! The subscriber starts on `RUST_LOG` or the built-in default level, so
//! messages emitted while loading configuration are not lost. Once the
//! configuration is known, [`LogFilter::apply_config_level`] switches to the
//! configured level unless `RUST_LOG` was set.

use todos_server_config::LoggingConfig;
use tracing_subscriber::{reload, EnvFilter, Registry};

pub type FilterLayer = reload::Layer<EnvFilter, Registry>;

pub struct LogFilter {
	handle: reload::Handle<EnvFilter, Registry>,
	from_env: bool,
}

impl LogFilter {
	/// Filter layer for the subscriber, plus the handle that retunes it.
	pub fn from_default_env() -> (FilterLayer, Self) {
		Self::with_env_filter(EnvFilter::try_from_default_env().ok())
	}

	fn with_env_filter(env_filter: Option<EnvFilter>) -> (FilterLayer, Self) {
		let from_env = env_filter.is_some();
		let initial = env_filter.unwrap_or_else(|| EnvFilter::new(LoggingConfig::default().level));
		let (layer, handle) = reload::Layer::new(initial);
		(layer, Self { handle, from_env })
	}

	/// Returns false when `RUST_LOG` takes precedence and nothing changed.
	pub fn apply_config_level(&self, level: &str) -> Result<bool, reload::Error> {
		if self.from_env {
			return Ok(false);
		}
		self.handle.reload(EnvFilter::new(level))?;
		Ok(true)
	}
}
