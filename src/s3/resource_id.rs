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

//! Identifier of a managed lifecycle configuration: `bucket[,owner]`.

use crate::s3::error::Error;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Separator between bucket and owner. Bucket names never contain it.
pub const ID_SEPARATOR: char = ',';

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub bucket: String,
    pub expected_bucket_owner: Option<String>,
}

impl ResourceId {
    pub fn new(bucket: impl Into<String>, expected_bucket_owner: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            expected_bucket_owner,
        }
    }

    /// Owner account id, or `""` when the id carries none.
    pub fn owner(&self) -> &str {
        self.expected_bucket_owner.as_deref().unwrap_or_default()
    }

    pub fn encode(&self) -> String {
        match &self.expected_bucket_owner {
            Some(owner) => format!("{}{ID_SEPARATOR}{owner}", self.bucket),
            None => self.bucket.clone(),
        }
    }

    pub fn decode(id: &str) -> Result<ResourceId, Error> {
        let malformed = |reason: &str| Error::MalformedId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = id.split(ID_SEPARATOR);
        let bucket = parts.next().unwrap_or_default();
        let owner = parts.next();
        if parts.next().is_some() {
            return Err(malformed("expected BUCKET or BUCKET,EXPECTED_BUCKET_OWNER"));
        }
        if bucket.is_empty() {
            return Err(malformed("bucket is empty"));
        }

        let expected_bucket_owner = match owner {
            None => None,
            Some("") => return Err(malformed("expected bucket owner is empty")),
            Some(owner) => {
                lazy_static! {
                    static ref ACCOUNT_ID_REGEX: Regex = Regex::new(r"^\d{12}$").unwrap();
                }
                if !ACCOUNT_ID_REGEX.is_match(owner) {
                    return Err(malformed(
                        "expected bucket owner must be a 12-digit account id",
                    ));
                }
                Some(owner.to_string())
            }
        };

        Ok(ResourceId {
            bucket: bucket.to_string(),
            expected_bucket_owner,
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::decode(s)
    }
}
