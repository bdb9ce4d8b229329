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

//! Bounded exponential backoff for read-after-write confirmation.

use async_trait::async_trait;
use rand::Rng;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use typed_builder::TypedBuilder;

/// Source of time for retry loops.
#[async_trait]
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Limits on how long the reconciler waits for the server to agree with a
/// write it just made.
#[derive(Clone, Debug, TypedBuilder)]
pub struct RetryPolicy {
    #[builder(default = Duration::from_millis(200))]
    pub initial_backoff: Duration,
    #[builder(default = Duration::from_secs(5))]
    pub max_backoff: Duration,
    #[builder(default = 2.0)]
    pub multiplier: f64,
    /// Fraction of each delay that is randomized, in `0.0..=1.0`
    #[builder(default = 0.2)]
    pub jitter: f64,
    /// Reads performed after the write, including the first
    #[builder(default = 20)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_secs(60))]
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::builder().build()
    }
}

impl RetryPolicy {
    /// Delay before the read following `attempt` reads, before jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            self.max_backoff
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Delay with jitter applied, never above `max_backoff`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 {
            return base;
        }
        let factor = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
        base.mul_f64(factor).min(self.max_backoff)
    }
}

/// Tracks attempts and elapsed time of one confirmation loop.
#[derive(Debug)]
pub(crate) struct RetryBudget<'a> {
    policy: &'a RetryPolicy,
    clock: &'a dyn Clock,
    started: Instant,
    attempts: u32,
}

impl<'a> RetryBudget<'a> {
    pub(crate) fn start(policy: &'a RetryPolicy, clock: &'a dyn Clock) -> Self {
        Self {
            policy,
            clock,
            started: clock.now(),
            attempts: 0,
        }
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started)
    }

    /// Delay before the next attempt, or `None` when the budget is spent.
    pub(crate) fn next_delay(&self) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        let remaining = self.policy.max_elapsed.checked_sub(self.elapsed())?;
        if remaining.is_zero() {
            return None;
        }
        Some(self.policy.delay(self.attempts).min(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct StepClock {
        start: Instant,
        offset: Mutex<Duration>,
    }

    #[async_trait]
    impl Clock for StepClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            *self.offset.lock().unwrap() += duration;
        }
    }

    #[test]
    fn test_defaults() {
        let p = RetryPolicy::default();
        assert_eq!(p.initial_backoff, Duration::from_millis(200));
        assert_eq!(p.max_backoff, Duration::from_secs(5));
        assert_eq!(p.max_attempts, 20);
        assert_eq!(p.max_elapsed, Duration::from_secs(60));
    }

    #[test]
    fn test_base_delay_grows_and_caps() {
        let p = RetryPolicy::default();
        assert_eq!(p.base_delay(1), Duration::from_millis(200));
        assert_eq!(p.base_delay(2), Duration::from_millis(400));
        assert_eq!(p.base_delay(3), Duration::from_millis(800));
        assert_eq!(p.base_delay(10), Duration::from_secs(5));
        assert_eq!(p.base_delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_bounds() {
        let p = RetryPolicy::default();
        for _ in 0..100 {
            let d = p.delay(2);
            assert!(d >= Duration::from_millis(320) && d <= Duration::from_millis(480));
        }
        let p = RetryPolicy::builder().jitter(0.0).build();
        assert_eq!(p.delay(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_budget_exhausted_by_attempts() {
        let clock = StepClock {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        };
        let p = RetryPolicy::builder().max_attempts(3).jitter(0.0).build();
        let mut budget = RetryBudget::start(&p, &clock);
        let mut slept = Vec::new();
        loop {
            budget.record_attempt();
            match budget.next_delay() {
                Some(d) => {
                    clock.sleep(d).await;
                    slept.push(d);
                }
                None => break,
            }
        }
        assert_eq!(budget.attempts(), 3);
        assert_eq!(
            slept,
            vec![Duration::from_millis(200), Duration::from_millis(400)]
        );
        assert_eq!(budget.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_budget_exhausted_by_time() {
        let clock = StepClock {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        };
        let p = RetryPolicy::builder()
            .max_elapsed(Duration::from_secs(1))
            .jitter(0.0)
            .build();
        let mut budget = RetryBudget::start(&p, &clock);
        loop {
            budget.record_attempt();
            match budget.next_delay() {
                Some(d) => clock.sleep(d).await,
                None => break,
            }
        }
        assert_eq!(budget.elapsed(), Duration::from_secs(1));
        assert!(budget.attempts() < p.max_attempts);
    }
}
