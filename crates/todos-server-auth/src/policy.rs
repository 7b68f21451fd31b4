// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static access policy loaded from a casbin-style CSV file.
//!
//! ```text
//! # subject,       path,   mode
//! p, admin,         /users, read
//! p, user,          /todo,  write
//! p, alice@ex.com,  /tasks, read
//! ```
//!
//! Blank lines and `#` comments are skipped. Any other line that is not a
//! four-field `p` rule fails the load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::instrument;

use crate::store::PolicyStore;
use crate::types::{AccessRule, Mode, Subject};

#[derive(Debug, Error)]
pub enum PolicyError {
	#[error("failed to read policy file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid policy line {line}: {message}")]
	Parse { line: usize, message: String },
}

/// Immutable rule set, indexed by subject name.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
	rules: HashMap<String, Vec<AccessRule>>,
}

impl PolicySet {
	pub fn new(rules: impl IntoIterator<Item = AccessRule>) -> Self {
		let mut set = Self::default();
		for rule in rules {
			set.insert(rule);
		}
		set
	}

	fn insert(&mut self, rule: AccessRule) {
		let entry = self.rules.entry(rule.subject.clone()).or_default();
		if !entry.contains(&rule) {
			entry.push(rule);
		}
	}

	#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let set = Self::from_csv_str(&content)?;
		tracing::info!(rules = set.len(), "loaded access policy");
		Ok(set)
	}

	pub fn from_csv_str(content: &str) -> Result<Self, PolicyError> {
		let mut set = Self::default();

		for (index, raw) in content.lines().enumerate() {
			let line = raw.trim();
			if line.is_empty() || line.starts_with('#') {
				continue;
			}
			set.insert(parse_rule(line, index + 1)?);
		}

		Ok(set)
	}

	/// Total number of distinct rules.
	pub fn len(&self) -> usize {
		self.rules.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

fn parse_rule(line: &str, line_no: usize) -> Result<AccessRule, PolicyError> {
	let fields: Vec<&str> = line.split(',').map(str::trim).collect();

	let [kind, subject, path, mode] = fields.as_slice() else {
		return Err(PolicyError::Parse {
			line: line_no,
			message: format!("expected 4 fields, found {}", fields.len()),
		});
	};

	if *kind != "p" {
		return Err(PolicyError::Parse {
			line: line_no,
			message: format!("unsupported rule type `{kind}`"),
		});
	}

	if subject.is_empty() || path.is_empty() {
		return Err(PolicyError::Parse {
			line: line_no,
			message: "subject and path must not be empty".to_string(),
		});
	}

	let mode = mode
		.parse::<Mode>()
		.map_err(|message| PolicyError::Parse {
			line: line_no,
			message,
		})?;

	Ok(AccessRule::new(*subject, *path, mode))
}

impl PolicyStore for PolicySet {
	fn rules_for_subject(&self, subject: &Subject) -> Vec<AccessRule> {
		self.rules.get(subject.name()).cloned().unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const POLICY: &str = "\
# roles
p, admin, /users, read
p, admin, /user, write
p, user, /todo, write

# identities
p, a@b.com, /tasks, read
";

	#[test]
	fn parses_rules_and_skips_comments() {
		let set = PolicySet::from_csv_str(POLICY).unwrap();
		assert_eq!(set.len(), 4);

		let admin = set.rules_for_subject(&Subject::Role("admin".into()));
		assert_eq!(admin.len(), 2);
		assert!(admin.contains(&AccessRule::new("admin", "/users", Mode::Read)));
	}

	#[test]
	fn identity_lookup_uses_email() {
		let set = PolicySet::from_csv_str(POLICY).unwrap();
		let rules = set.rules_for_subject(&Subject::Identity("a@b.com".into()));
		assert_eq!(rules, vec![AccessRule::new("a@b.com", "/tasks", Mode::Read)]);
	}

	#[test]
	fn unknown_subject_has_no_rules() {
		let set = PolicySet::from_csv_str(POLICY).unwrap();
		assert!(set
			.rules_for_subject(&Subject::Role("guest".into()))
			.is_empty());
	}

	#[test]
	fn duplicate_rules_are_collapsed() {
		let set = PolicySet::from_csv_str("p, user, /todo, write\np,user,/todo,write\n").unwrap();
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn rejects_unknown_mode() {
		let err = PolicySet::from_csv_str("p, user, /todo, delete").unwrap_err();
		assert!(matches!(err, PolicyError::Parse { line: 1, .. }));
	}

	#[test]
	fn rejects_grouping_lines() {
		let err = PolicySet::from_csv_str("p, user, /todo, read\ng, alice, admin").unwrap_err();
		assert!(matches!(err, PolicyError::Parse { line: 2, .. }));
	}

	#[test]
	fn rejects_wrong_field_count() {
		assert!(PolicySet::from_csv_str("p, user, /todo").is_err());
		assert!(PolicySet::from_csv_str("p, user, /todo, read, extra").is_err());
	}

	#[test]
	fn loads_from_file() {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(POLICY.as_bytes()).unwrap();

		let set = PolicySet::from_file(file.path()).unwrap();
		assert_eq!(set.len(), 4);
	}

	#[test]
	fn missing_file_is_read_error() {
		let err = PolicySet::from_file(Path::new("/nonexistent/policy.csv")).unwrap_err();
		assert!(matches!(err, PolicyError::Read { .. }));
	}
}
