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

//! Create, read, update and delete of a bucket lifecycle configuration
//! against an eventually consistent remote API.
//!
//! Writes replace the whole rule set and are then confirmed by reading the
//! configuration back until it matches. When the server keeps returning a
//! stale view past the retry budget the write is still reported as
//! successful, with a [`StaleReadWarning`] attached.

use crate::s3::error::{Error, Result};
use crate::s3::lifecycle_config::{LifecycleConfig, LifecycleRule};
use crate::s3::plan::{Plan, diff, plan};
use crate::s3::resource_id::ResourceId;
use crate::s3::retry::{Clock, RetryBudget, RetryPolicy, SystemClock};
use crate::s3::types::LifecycleApi;
use crate::s3::utils::check_bucket_name;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The server did not reflect a write within the retry budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaleReadWarning {
    pub attempts: u32,
    pub elapsed: Duration,
    /// Last configuration the server returned; `None` if it was absent
    pub last_observed: Option<LifecycleConfig>,
}

/// Result of a successful [`Reconciler::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedState {
    pub id: ResourceId,
    /// Confirmed configuration, or the written one when confirmation timed out
    pub config: LifecycleConfig,
    pub stale_read: Option<StaleReadWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(LifecycleConfig),
    Absent,
}

impl ReadOutcome {
    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }

    pub fn config(&self) -> Option<&LifecycleConfig> {
        match self {
            ReadOutcome::Present(config) => Some(config),
            ReadOutcome::Absent => None,
        }
    }

    pub fn into_config(self) -> Option<LifecycleConfig> {
        match self {
            ReadOutcome::Present(config) => Some(config),
            ReadOutcome::Absent => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestroyOutcome {
    /// No configuration existed when destroy started
    pub already_absent: bool,
    pub stale_read: Option<StaleReadWarning>,
}

/// Drives one bucket's lifecycle configuration towards a desired state.
#[derive(Clone, Debug)]
pub struct Reconciler<A: LifecycleApi> {
    api: A,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl<A: LifecycleApi> Reconciler<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Operations in flight return [`Error::Cancelled`] once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Writes `rules` as the complete configuration of `bucket` and waits for
    /// the server to return it.
    pub async fn apply(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        rules: Vec<LifecycleRule>,
    ) -> Result<AppliedState> {
        check_bucket_name(bucket, false)?;
        let config = LifecycleConfig::new(rules);
        config.validate()?;
        let desired = config.canonical();

        self.cancellable(
            self.api
                .put_bucket_lifecycle(bucket, expected_owner, &desired),
        )
        .await?;
        log::info!(
            "put lifecycle configuration of bucket {bucket} with {} rule(s)",
            desired.rules.len()
        );

        let id = ResourceId::new(bucket, expected_owner.map(str::to_string));
        let mut budget = RetryBudget::start(&self.retry, self.clock.as_ref());
        let last_observed = loop {
            budget.record_attempt();
            let observed = self.get_config(bucket, expected_owner).await?;
            if let Some(current) = &observed {
                if !diff(&desired.rules, &current.rules).will_change {
                    return Ok(AppliedState {
                        id,
                        config: current.canonical(),
                        stale_read: None,
                    });
                }
            }
            match budget.next_delay() {
                Some(delay) => {
                    log::debug!(
                        "lifecycle configuration of bucket {bucket} not yet visible after {} read(s); retrying in {delay:?}",
                        budget.attempts()
                    );
                    self.sleep(delay).await?;
                }
                None => break observed,
            }
        };

        let warning = StaleReadWarning {
            attempts: budget.attempts(),
            elapsed: budget.elapsed(),
            last_observed: last_observed.map(|c| c.canonical()),
        };
        log::warn!(
            "lifecycle configuration of bucket {bucket} still stale after {} read(s) in {:?}",
            warning.attempts,
            warning.elapsed
        );
        Ok(AppliedState {
            id,
            config: desired,
            stale_read: Some(warning),
        })
    }

    /// Reads the current configuration of `bucket` in canonical form.
    pub async fn read(&self, bucket: &str, expected_owner: Option<&str>) -> Result<ReadOutcome> {
        check_bucket_name(bucket, false)?;
        match self.get_config(bucket, expected_owner).await? {
            Some(config) => Ok(ReadOutcome::Present(config.canonical())),
            None => {
                log::warn!("lifecycle configuration of bucket {bucket} not found");
                Ok(ReadOutcome::Absent)
            }
        }
    }

    /// Reads the current configuration and plans the change to `desired`.
    pub async fn plan(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        desired: &[LifecycleRule],
    ) -> Result<Plan> {
        let current = self.read(bucket, expected_owner).await?;
        Ok(plan(desired, current.config()))
    }

    /// Removes the configuration of `bucket`. Succeeds if it is already gone.
    pub async fn destroy(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<DestroyOutcome> {
        check_bucket_name(bucket, false)?;
        if self.get_config(bucket, expected_owner).await?.is_none() {
            log::debug!("lifecycle configuration of bucket {bucket} already absent");
            return Ok(DestroyOutcome {
                already_absent: true,
                stale_read: None,
            });
        }

        match self
            .cancellable(self.api.delete_bucket_lifecycle(bucket, expected_owner))
            .await
        {
            Ok(()) => log::info!("deleted lifecycle configuration of bucket {bucket}"),
            Err(e) if e.is_no_such_lifecycle_configuration() => {
                return Ok(DestroyOutcome {
                    already_absent: true,
                    stale_read: None,
                });
            }
            Err(e) => return Err(e),
        }

        let mut budget = RetryBudget::start(&self.retry, self.clock.as_ref());
        let last_observed = loop {
            budget.record_attempt();
            let observed = match self.get_config(bucket, expected_owner).await? {
                None => {
                    return Ok(DestroyOutcome {
                        already_absent: false,
                        stale_read: None,
                    });
                }
                Some(config) => config,
            };
            match budget.next_delay() {
                Some(delay) => {
                    log::debug!(
                        "lifecycle configuration of bucket {bucket} still visible after delete; retrying in {delay:?}"
                    );
                    self.sleep(delay).await?;
                }
                None => break observed,
            }
        };

        let warning = StaleReadWarning {
            attempts: budget.attempts(),
            elapsed: budget.elapsed(),
            last_observed: Some(last_observed.canonical()),
        };
        log::warn!(
            "lifecycle configuration of bucket {bucket} still visible after delete; gave up after {} read(s)",
            warning.attempts
        );
        Ok(DestroyOutcome {
            already_absent: false,
            stale_read: Some(warning),
        })
    }

    /// Decodes an import identifier.
    pub fn import(&self, id: &str) -> Result<ResourceId> {
        let id = ResourceId::decode(id)?;
        check_bucket_name(&id.bucket, false)?;
        Ok(id)
    }

    /// Decodes an import identifier and reads the configuration it names.
    pub async fn import_state(&self, id: &str) -> Result<(ResourceId, ReadOutcome)> {
        let id = self.import(id)?;
        let outcome = self
            .read(&id.bucket, id.expected_bucket_owner.as_deref())
            .await?;
        Ok((id, outcome))
    }

    /// `None` when the bucket has no configuration.
    async fn get_config(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<Option<LifecycleConfig>> {
        match self
            .cancellable(self.api.get_bucket_lifecycle(bucket, expected_owner))
            .await
        {
            Ok(config) if config.is_empty() => Ok(None),
            Ok(config) => Ok(Some(config)),
            Err(e) if e.is_no_such_lifecycle_configuration() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = fut => res,
        }
    }

    async fn sleep(&self, duration: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = self.clock.sleep(duration) => Ok(()),
        }
    }
}
