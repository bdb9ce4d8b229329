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

//! In-memory stand-in for the bucket lifecycle API of an S3 server.

use async_trait::async_trait;
use s3_lifecycle::s3::error::Error;
use s3_lifecycle::s3::error_response::{S3ErrorCode, S3ErrorResponse};
use s3_lifecycle::s3::lifecycle_config::LifecycleConfig;
use s3_lifecycle::s3::types::LifecycleApi;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct BucketState {
    owner: Option<String>,
    config: Option<LifecycleConfig>,
    /// What readers still see while a write has not propagated
    previous: Option<LifecycleConfig>,
    stale_reads_left: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    buckets: HashMap<String, BucketState>,
    stale_reads: u32,
    always_stale: bool,
    hang_gets: bool,
    put_failures: VecDeque<S3ErrorResponse>,
    get_failures: VecDeque<S3ErrorResponse>,
    puts: Vec<LifecycleConfig>,
    gets: usize,
    deletes: usize,
}

/// Eventually consistent lifecycle API kept in memory.
///
/// After every write the next `stale_reads` GETs still return the state from
/// before the write.
#[derive(Debug, Default)]
pub struct FakeLifecycleApi {
    state: Mutex<FakeState>,
}

fn s3_error(code: S3ErrorCode, message: &str, bucket: &str) -> Error {
    S3ErrorResponse::new(
        Default::default(),
        code,
        Some(message.to_string()),
        format!("/{bucket}"),
        "FAKE-REQUEST".to_string(),
        "fake-host".to_string(),
        Some(bucket.to_string()),
    )
    .into()
}

impl FakeLifecycleApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str, owner: Option<&str>) -> Self {
        self.state.lock().unwrap().buckets.insert(
            bucket.to_string(),
            BucketState {
                owner: owner.map(str::to_string),
                ..Default::default()
            },
        );
        self
    }

    pub fn with_stale_reads(self, count: u32) -> Self {
        self.state.lock().unwrap().stale_reads = count;
        self
    }

    /// GETs never reflect writes made through the API.
    pub fn with_always_stale(self) -> Self {
        self.state.lock().unwrap().always_stale = true;
        self
    }

    /// GETs never complete.
    pub fn with_hanging_gets(self) -> Self {
        self.state.lock().unwrap().hang_gets = true;
        self
    }

    /// Replaces the configuration directly, visible at once.
    pub fn set_config(&self, bucket: &str, config: Option<LifecycleConfig>) {
        let mut state = self.state.lock().unwrap();
        let entry = state.buckets.entry(bucket.to_string()).or_default();
        entry.previous = config.clone();
        entry.config = config;
        entry.stale_reads_left = 0;
    }

    /// Deletes the configuration behind the reconciler's back.
    pub fn remove_out_of_band(&self, bucket: &str) {
        self.set_config(bucket, None);
    }

    pub fn config(&self, bucket: &str) -> Option<LifecycleConfig> {
        let state = self.state.lock().unwrap();
        state.buckets.get(bucket).and_then(|b| b.config.clone())
    }

    pub fn fail_next_put(&self, error: S3ErrorResponse) {
        self.state.lock().unwrap().put_failures.push_back(error);
    }

    pub fn fail_next_get(&self, error: S3ErrorResponse) {
        self.state.lock().unwrap().get_failures.push_back(error);
    }

    /// Bodies of every successful PUT, oldest first.
    pub fn puts(&self) -> Vec<LifecycleConfig> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn get_count(&self) -> usize {
        self.state.lock().unwrap().gets
    }

    pub fn delete_count(&self) -> usize {
        self.state.lock().unwrap().deletes
    }

    fn bucket_mut<'a>(
        state: &'a mut FakeState,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<&'a mut BucketState, Error> {
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| {
                s3_error(
                    S3ErrorCode::NoSuchBucket,
                    "The specified bucket does not exist",
                    bucket,
                )
            })?;
        if let Some(owner) = expected_owner {
            if entry.owner.as_deref() != Some(owner) {
                return Err(s3_error(S3ErrorCode::AccessDenied, "Access Denied", bucket));
            }
        }
        Ok(entry)
    }

    fn write(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        config: Option<LifecycleConfig>,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let stale_reads = state.stale_reads;
        let entry = Self::bucket_mut(&mut state, bucket, expected_owner)?;
        entry.previous = entry.config.take();
        entry.config = config;
        entry.stale_reads_left = stale_reads;
        Ok(())
    }
}

#[async_trait]
impl LifecycleApi for FakeLifecycleApi {
    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        config: &LifecycleConfig,
    ) -> Result<(), Error> {
        if let Some(err) = self.state.lock().unwrap().put_failures.pop_front() {
            return Err(err.into());
        }
        self.write(bucket, expected_owner, Some(config.clone()))?;
        self.state.lock().unwrap().puts.push(config.clone());
        Ok(())
    }

    async fn get_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<LifecycleConfig, Error> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.gets += 1;
            state.hang_gets
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.get_failures.pop_front() {
            return Err(err.into());
        }
        let always_stale = state.always_stale;
        let entry = Self::bucket_mut(&mut state, bucket, expected_owner)?;
        let visible = if always_stale {
            entry.previous.clone()
        } else if entry.stale_reads_left > 0 {
            entry.stale_reads_left -= 1;
            entry.previous.clone()
        } else {
            entry.config.clone()
        };
        visible.ok_or_else(|| {
            s3_error(
                S3ErrorCode::NoSuchLifecycleConfiguration,
                "The lifecycle configuration does not exist",
                bucket,
            )
        })
    }

    async fn delete_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<(), Error> {
        self.state.lock().unwrap().deletes += 1;
        self.write(bucket, expected_owner, None)
    }
}
