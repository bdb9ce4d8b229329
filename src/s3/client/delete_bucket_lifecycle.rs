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
use crate::s3::error::Error;
use crate::s3::header_constants::LIFECYCLE;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use http::Method;

impl S3Client {
    pub async fn delete_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<(), Error> {
        let mut query = Multimap::new();
        query.add(LIFECYCLE, "");

        self.execute(Method::DELETE, bucket, expected_owner, &query, None)
            .await?;
        Ok(())
    }
}
