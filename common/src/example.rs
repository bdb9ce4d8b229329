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

//! Lifecycle rule fixtures covering the shapes users commonly declare.

use chrono::{TimeZone, Utc};
use s3_lifecycle::s3::filter::{AndOperator, Filter};
use s3_lifecycle::s3::lifecycle_config::{
    AbortIncompleteMultipartUpload, Expiration, LifecycleRule, NoncurrentVersionExpiration,
    NoncurrentVersionTransition, Transition,
};
use s3_lifecycle::s3::types::{RuleStatus, StorageClass};

pub fn expire_rule(id: &str, prefix: &str, days: u32) -> LifecycleRule {
    LifecycleRule {
        id: id.to_string(),
        filter: Filter::prefix(prefix),
        expiration: Some(Expiration::days(days)),
        ..Default::default()
    }
}

/// One enabled rule expiring `path1/` after a year.
pub fn basic_rules() -> Vec<LifecycleRule> {
    vec![expire_rule("id1", "path1/", 365)]
}

pub fn multiple_rules() -> Vec<LifecycleRule> {
    vec![
        expire_rule("id1", "path1/", 365),
        LifecycleRule {
            id: "id2".to_string(),
            filter: Filter::prefix("path2/"),
            expiration: Some(Expiration::date(
                Utc.with_ymd_and_hms(2030, 1, 12, 0, 0, 0).unwrap(),
            )),
            ..Default::default()
        },
        LifecycleRule {
            id: "id3".to_string(),
            status: RuleStatus::Disabled,
            filter: Filter::prefix("path3/"),
            abort_incomplete_multipart_upload: Some(AbortIncompleteMultipartUpload {
                days_after_initiation: 7,
            }),
            ..Default::default()
        },
    ]
}

pub fn transition_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "archive".to_string(),
        filter: Filter::prefix("logs/"),
        transitions: vec![
            Transition::after_days(90, StorageClass::Glacier),
            Transition::after_days(30, StorageClass::StandardIa),
        ],
        expiration: Some(Expiration::days(365)),
        ..Default::default()
    }]
}

pub fn noncurrent_version_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "noncurrent".to_string(),
        noncurrent_version_transitions: vec![NoncurrentVersionTransition {
            noncurrent_days: 30,
            newer_noncurrent_versions: Some(2),
            storage_class: StorageClass::StandardIa,
        }],
        noncurrent_version_expiration: Some(NoncurrentVersionExpiration {
            noncurrent_days: 90,
            newer_noncurrent_versions: None,
        }),
        ..Default::default()
    }]
}

pub fn object_size_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "big-and-small".to_string(),
        filter: Filter::And(
            AndOperator::default()
                .with_object_size_greater_than(500)
                .with_object_size_less_than(64000),
        ),
        expiration: Some(Expiration::days(30)),
        ..Default::default()
    }]
}

pub fn tagged_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "tagged".to_string(),
        filter: Filter::And(
            AndOperator::default()
                .with_prefix("tmp/")
                .with_tag("team", "storage")
                .with_tag("env", "dev"),
        ),
        expiration: Some(Expiration::days(3)),
        ..Default::default()
    }]
}

pub fn delete_marker_rules() -> Vec<LifecycleRule> {
    vec![LifecycleRule {
        id: "markers".to_string(),
        expiration: Some(Expiration::expired_object_delete_marker()),
        noncurrent_version_expiration: Some(NoncurrentVersionExpiration {
            noncurrent_days: 1,
            newer_noncurrent_versions: None,
        }),
        ..Default::default()
    }]
}
