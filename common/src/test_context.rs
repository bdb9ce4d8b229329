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

use crate::utils::init_logger;
use s3_lifecycle::s3::S3Client;
use s3_lifecycle::s3::creds::StaticProvider;
use s3_lifecycle::s3::http::BaseUrl;

/// Connection settings for tests that run against a live server.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub client: S3Client,
    pub base_url: BaseUrl,
    pub access_key: String,
    pub secret_key: String,
    pub ignore_cert_check: bool,
    /// Existing bucket the live tests may freely reconfigure
    pub bucket: String,
}

impl TestContext {
    pub fn new_from_env() -> Self {
        const DEFAULT_SERVER_ENDPOINT: &str = "http://localhost:9000";
        const DEFAULT_ACCESS_KEY: &str = "minioadmin";
        const DEFAULT_SECRET_KEY: &str = "minioadmin";
        const DEFAULT_TEST_BUCKET: &str = "lifecycle-test";

        init_logger();

        let host = std::env::var("SERVER_ENDPOINT").unwrap_or(DEFAULT_SERVER_ENDPOINT.to_string());
        log::debug!("SERVER_ENDPOINT={host}");
        let access_key = std::env::var("ACCESS_KEY").unwrap_or(DEFAULT_ACCESS_KEY.to_string());
        log::debug!("ACCESS_KEY={access_key}");
        let secret_key = std::env::var("SECRET_KEY").unwrap_or(DEFAULT_SECRET_KEY.to_string());
        log::debug!("SECRET_KEY=*****");
        let secure: Option<bool> = std::env::var("ENABLE_HTTPS")
            .ok()
            .map(|v| v.parse().unwrap_or(false));
        let ignore_cert_check: bool = std::env::var("IGNORE_CERT_CHECK")
            .map(|v| v.parse().unwrap_or(true))
            .unwrap_or(false);
        log::debug!("IGNORE_CERT_CHECK={ignore_cert_check}");
        let region = std::env::var("SERVER_REGION").ok();
        log::debug!("SERVER_REGION={region:?}");
        let bucket =
            std::env::var("LIFECYCLE_TEST_BUCKET").unwrap_or(DEFAULT_TEST_BUCKET.to_string());
        log::debug!("LIFECYCLE_TEST_BUCKET={bucket}");

        let mut base_url: BaseUrl = host.parse().unwrap();
        if let Some(secure) = secure {
            base_url.https = secure;
        }
        if let Some(region) = region {
            base_url.region = region;
        }

        let client = S3Client::builder(base_url.clone())
            .provider(StaticProvider::new(&access_key, &secret_key, None))
            .ignore_cert_check(ignore_cert_check)
            .app_info("lifecycle-tests", env!("CARGO_PKG_VERSION"))
            .build()
            .unwrap();

        Self {
            client,
            base_url,
            access_key,
            secret_key,
            ignore_cert_check,
            bucket,
        }
    }
}
