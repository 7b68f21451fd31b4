// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration primitives shared across the todos crates.
//!
//! - [`Secret<T>`]: keeps signing keys and passwords out of logs and config dumps
//! - [`load_secret_env`]: reads a secret from `VAR` or from the file named by `VAR_FILE`

pub mod env;
pub mod secret;

pub use env::{load_secret_env, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
