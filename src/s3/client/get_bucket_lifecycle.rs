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

use crate::s3::client::S3Client;
use crate::s3::error::{Error, ValidationErr};
use crate::s3::header_constants::LIFECYCLE;
use crate::s3::lifecycle_config::LifecycleConfig;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use bytes::Buf;
use http::Method;
use xmltree::Element;

impl S3Client {
    /// Returns the lifecycle configuration of `bucket` as the server sent it.
    ///
    /// A bucket without configuration yields an S3 error with code
    /// `NoSuchLifecycleConfiguration`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use s3_lifecycle::s3::S3Client;
    /// use s3_lifecycle::s3::creds::StaticProvider;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = S3Client::builder("http://localhost:9000".parse().unwrap())
    ///         .provider(StaticProvider::new("minioadmin", "minioadmin", None))
    ///         .build()
    ///         .unwrap();
    ///     let config = client.get_bucket_lifecycle("bucket-name", None).await.unwrap();
    ///     println!("bucket has {} lifecycle rule(s)", config.rules.len());
    /// }
    /// ```
    pub async fn get_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<LifecycleConfig, Error> {
        let mut query = Multimap::new();
        query.add(LIFECYCLE, "");

        let resp = self
            .execute(Method::GET, bucket, expected_owner, &query, None)
            .await?;
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader()).map_err(ValidationErr::from)?;
        Ok(LifecycleConfig::from_xml(&root)?)
    }
}
