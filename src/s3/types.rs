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

//! Basic lifecycle types and the remote API boundary

use crate::s3::error::{Error, ValidationErr};
use crate::s3::lifecycle_config::LifecycleConfig;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Whether a lifecycle rule is currently applied by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RuleStatus {
    #[default]
    Enabled,
    Disabled,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Enabled => "Enabled",
            RuleStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = ValidationErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enabled" => Ok(RuleStatus::Enabled),
            "Disabled" => Ok(RuleStatus::Disabled),
            _ => Err(ValidationErr::InvalidRuleStatus(s.to_string())),
        }
    }
}

/// Storage class an object is transitioned to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageClass {
    Glacier,
    StandardIa,
    OnezoneIa,
    IntelligentTiering,
    DeepArchive,
    GlacierIr,
    /// Any class this crate does not know by name, e.g. a MinIO remote tier
    Other(String),
}

impl StorageClass {
    pub fn as_str(&self) -> &str {
        match self {
            StorageClass::Glacier => "GLACIER",
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
            StorageClass::GlacierIr => "GLACIER_IR",
            StorageClass::Other(s) => s,
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageClass {
    type Err = ValidationErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GLACIER" => StorageClass::Glacier,
            "STANDARD_IA" => StorageClass::StandardIa,
            "ONEZONE_IA" => StorageClass::OnezoneIa,
            "INTELLIGENT_TIERING" => StorageClass::IntelligentTiering,
            "DEEP_ARCHIVE" => StorageClass::DeepArchive,
            "GLACIER_IR" => StorageClass::GlacierIr,
            "" => return Err(ValidationErr::InvalidStorageClass(s.to_string())),
            other => StorageClass::Other(other.to_string()),
        })
    }
}

#[derive(PartialEq, Eq, Clone, Debug, Hash, PartialOrd, Ord)]
/// Contains key and value
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Remote control API for a bucket's lifecycle configuration.
///
/// `expected_owner` is the account id the bucket must belong to; the server
/// rejects the request when the bucket is owned by someone else.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Replaces the whole configuration of `bucket`.
    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        config: &LifecycleConfig,
    ) -> Result<(), Error>;

    /// Returns the configuration of `bucket`, or an S3 error with code
    /// `NoSuchLifecycleConfiguration` when there is none.
    async fn get_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<LifecycleConfig, Error>;

    async fn delete_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<(), Error>;
}

#[async_trait]
impl<T: LifecycleApi + ?Sized> LifecycleApi for std::sync::Arc<T> {
    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        config: &LifecycleConfig,
    ) -> Result<(), Error> {
        (**self)
            .put_bucket_lifecycle(bucket, expected_owner, config)
            .await
    }

    async fn get_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<LifecycleConfig, Error> {
        (**self).get_bucket_lifecycle(bucket, expected_owner).await
    }

    async fn delete_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<(), Error> {
        (**self).delete_bucket_lifecycle(bucket, expected_owner).await
    }
}
