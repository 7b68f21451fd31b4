// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Merges role and identity rules into one per-path permission map.
//!
//! Role rules are folded first, then identity rules on top. Folding only ever
//! sets flags, so an identity rule can widen what a role grants but never
//! narrow it. The result does not depend on rule order.

use std::sync::Arc;

use crate::store::PolicyStore;
use crate::types::{AccessRule, Mode, Permissions, Subject};

/// Fold `rules` into `permissions`, setting the rule's mode on its path.
pub fn merge_rules<'a>(permissions: &mut Permissions, rules: impl IntoIterator<Item = &'a AccessRule>) {
	for rule in rules {
		permissions
			.entry(rule.path.clone())
			.or_default()
			.grant(rule.mode);
	}
}

#[derive(Clone)]
pub struct PermissionResolver {
	policy: Arc<dyn PolicyStore>,
}

impl PermissionResolver {
	pub fn new(policy: Arc<dyn PolicyStore>) -> Self {
		Self { policy }
	}

	/// Merged permissions for a role-name and an identity (email).
	pub fn resolve(&self, role: &str, identity: &str) -> Permissions {
		let mut permissions = Permissions::new();
		merge_rules(
			&mut permissions,
			&self.policy.rules_for_subject(&Subject::Role(role.to_string())),
		);
		merge_rules(
			&mut permissions,
			&self
				.policy
				.rules_for_subject(&Subject::Identity(identity.to_string())),
		);
		permissions
	}

	/// Whether a raw role rule grants `mode` on `path`, without merging.
	pub fn role_grants(&self, role: &str, path: &str, mode: Mode) -> bool {
		self.policy
			.rules_for_subject(&Subject::Role(role.to_string()))
			.iter()
			.any(|rule| rule.path == path && rule.mode == mode)
	}
}
