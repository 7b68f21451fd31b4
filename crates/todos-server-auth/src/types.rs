// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core access-control types shared by the resolver, policy set and gate.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use http::Method;
use serde::{Deserialize, Serialize};

/// Numeric user identifier (SQLite rowid).
pub type UserId = i64;

/// Role-name that counts as privileged for user administration.
pub const ADMIN_ROLE: &str = "admin";

/// Role-name given to newly registered users.
pub const DEFAULT_ROLE: &str = "user";

/// Default session lifetime.
pub const SESSION_LIFETIME_HOURS: i64 = 48;

/// Resource paths the gate enforces permissions on. Authenticated requests to
/// any other path are let through.
pub const PROTECTED_RESOURCES: &[&str] = &["/users", "/user", "/todo", "/todos", "/task", "/tasks"];

/// Operation mode derived from the HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	Read,
	Write,
}

impl Mode {
	/// POST, PUT, DELETE and PATCH write; everything else reads.
	pub fn from_method(method: &Method) -> Self {
		if method == Method::POST
			|| method == Method::PUT
			|| method == Method::DELETE
			|| method == Method::PATCH
		{
			Mode::Write
		} else {
			Mode::Read
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Mode::Read => "read",
			Mode::Write => "write",
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Mode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"read" => Ok(Mode::Read),
			"write" => Ok(Mode::Write),
			other => Err(format!("unknown mode: {other}")),
		}
	}
}

/// Who an access rule is granted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
	/// A role-name such as `admin` or `user`.
	Role(String),
	/// A single user, identified by email.
	Identity(String),
}

impl Subject {
	pub fn name(&self) -> &str {
		match self {
			Subject::Role(name) | Subject::Identity(name) => name,
		}
	}
}

/// One `(subject, resource-path, mode)` grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessRule {
	pub subject: String,
	pub path: String,
	pub mode: Mode,
}

impl AccessRule {
	pub fn new(subject: impl Into<String>, path: impl Into<String>, mode: Mode) -> Self {
		Self {
			subject: subject.into(),
			path: path.into(),
			mode,
		}
	}
}

/// Read/write flags for a single resource path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPermission {
	pub read: bool,
	pub write: bool,
}

impl PathPermission {
	pub fn allows(&self, mode: Mode) -> bool {
		match mode {
			Mode::Read => self.read,
			Mode::Write => self.write,
		}
	}

	pub fn grant(&mut self, mode: Mode) {
		match mode {
			Mode::Read => self.read = true,
			Mode::Write => self.write = true,
		}
	}
}

/// Merged per-path permissions for one user. Computed per request, never stored.
pub type Permissions = BTreeMap<String, PathPermission>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn write_methods() {
		assert_eq!(Mode::from_method(&Method::POST), Mode::Write);
		assert_eq!(Mode::from_method(&Method::PUT), Mode::Write);
		assert_eq!(Mode::from_method(&Method::DELETE), Mode::Write);
		assert_eq!(Mode::from_method(&Method::PATCH), Mode::Write);
	}

	#[test]
	fn read_methods() {
		assert_eq!(Mode::from_method(&Method::GET), Mode::Read);
		assert_eq!(Mode::from_method(&Method::HEAD), Mode::Read);
		assert_eq!(Mode::from_method(&Method::OPTIONS), Mode::Read);
	}

	#[test]
	fn mode_parses_policy_values() {
		assert_eq!("read".parse::<Mode>(), Ok(Mode::Read));
		assert_eq!("write".parse::<Mode>(), Ok(Mode::Write));
		assert!("delete".parse::<Mode>().is_err());
	}

	#[test]
	fn subject_name_ignores_kind() {
		assert_eq!(Subject::Role("admin".into()).name(), "admin");
		assert_eq!(Subject::Identity("a@b.com".into()).name(), "a@b.com");
	}

	#[test]
	fn grant_sets_only_that_mode() {
		let mut perm = PathPermission::default();
		perm.grant(Mode::Write);

		assert!(perm.allows(Mode::Write));
		assert!(!perm.allows(Mode::Read));
	}

	#[test]
	fn path_permission_serializes_as_flags() {
		let perm = PathPermission {
			read: true,
			write: false,
		};
		let json = serde_json::to_string(&perm).unwrap();
		assert_eq!(json, r#"{"read":true,"write":false}"#);
	}
}
