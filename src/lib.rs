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

//! # S3 lifecycle reconciler (`s3-lifecycle`)
//!
//! This crate keeps the lifecycle configuration of an S3 bucket in line with a
//! declared rule set, the way an infrastructure-as-code resource would.
//!
//! The pieces, leaf first:
//! - [`s3::lifecycle_config`] holds the typed rule model and its XML encoding.
//! - [`s3::filter`] turns the many accepted filter shapes into one canonical [`s3::filter::Filter`].
//! - [`s3::plan`] compares desired and observed rule sets without doing any I/O.
//! - [`s3::reconciler`] applies, reads, destroys and imports configurations through a
//!   [`s3::types::LifecycleApi`] and waits out eventual consistency.
//! - [`s3::resource_id`] encodes the `bucket[,expected-owner]` identifier.
//!
//! [`s3::client::S3Client`] implements [`s3::types::LifecycleApi`] over signed HTTP requests.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use s3_lifecycle::s3::S3Client;
//! use s3_lifecycle::s3::creds::StaticProvider;
//! use s3_lifecycle::s3::filter::Filter;
//! use s3_lifecycle::s3::lifecycle_config::{Expiration, LifecycleRule};
//! use s3_lifecycle::s3::reconciler::Reconciler;
//! use s3_lifecycle::s3::types::RuleStatus;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = S3Client::builder("http://localhost:9000".parse().unwrap())
//!         .provider(StaticProvider::new("minioadmin", "minioadmin", None))
//!         .build()
//!         .unwrap();
//!     let reconciler = Reconciler::new(client);
//!
//!     let rules = vec![LifecycleRule {
//!         id: "expire-logs".into(),
//!         status: RuleStatus::Enabled,
//!         filter: Filter::Prefix("logs/".into()),
//!         expiration: Some(Expiration::days(365)),
//!         ..Default::default()
//!     }];
//!
//!     let applied = reconciler.apply("my-bucket", None, rules).await.unwrap();
//!     println!("applied lifecycle configuration {}", applied.id);
//! }
//! ```

#![allow(clippy::result_large_err)]
pub mod s3;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;
