// MinIO Rust Library for Amazon S3 Compatible Cloud Storage
// Copyright 2025 MinIO, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Comparison of a desired rule set against an observed one.
//!
//! The remote API only supports whole-set replacement, so a plan either
//! leaves the configuration alone or rewrites every rule.

use crate::s3::lifecycle_config::{LifecycleConfig, LifecycleRule};
use std::collections::HashMap;

/// What happened to one rule id between observed and desired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleChange {
    Added(String),
    Removed(String),
    Modified(String),
}

impl RuleChange {
    pub fn rule_id(&self) -> &str {
        match self {
            RuleChange::Added(id) | RuleChange::Removed(id) | RuleChange::Modified(id) => id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Plan {
    pub will_change: bool,
    /// Canonical desired rules in declaration order
    pub rules_to_apply: Vec<LifecycleRule>,
    /// Added and modified rules in desired order, then removed rules in
    /// observed order
    pub changes: Vec<RuleChange>,
}

/// Compares `desired` against `observed`, matching rules by id.
pub fn diff(desired: &[LifecycleRule], observed: &[LifecycleRule]) -> Plan {
    let rules_to_apply: Vec<LifecycleRule> =
        desired.iter().map(LifecycleRule::canonical).collect();

    let observed_by_id: HashMap<&str, LifecycleRule> = observed
        .iter()
        .map(|r| (r.id.as_str(), r.canonical()))
        .collect();

    let mut changes = Vec::new();
    for rule in &rules_to_apply {
        match observed_by_id.get(rule.id.as_str()) {
            None => changes.push(RuleChange::Added(rule.id.clone())),
            Some(current) if current != rule => changes.push(RuleChange::Modified(rule.id.clone())),
            Some(_) => {}
        }
    }

    for rule in observed {
        if !desired.iter().any(|d| d.id == rule.id) {
            changes.push(RuleChange::Removed(rule.id.clone()));
        }
    }

    Plan {
        will_change: !changes.is_empty(),
        rules_to_apply,
        changes,
    }
}

/// Plans against an observed configuration that may not exist.
pub fn plan(desired: &[LifecycleRule], observed: Option<&LifecycleConfig>) -> Plan {
    let observed = observed.map(|c| c.rules.as_slice()).unwrap_or_default();
    diff(desired, observed)
}
