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

//! HTTP client for the bucket lifecycle subresource of an S3 compatible
//! service.
//!
//! Requests are signed with AWS Signature Version 4 when a credential
//! provider yields credentials, and sent anonymously otherwise.

use bytes::Bytes;
use http::{HeaderMap, Method};
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use crate::s3::creds::Provider;
use crate::s3::error::{Error, NetworkError, S3ServerError, ValidationErr};
use crate::s3::error_response::{S3ErrorCode, S3ErrorResponse};
use crate::s3::header_constants::*;
use crate::s3::http::BaseUrl;
use crate::s3::lifecycle_config::LifecycleConfig;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::signer::sign_v4_s3;
use crate::s3::types::LifecycleApi;
use crate::s3::utils::{
    EMPTY_SHA256, check_bucket_name, md5sum_hash, sha256_hash, to_amz_date, utc_now,
};
use async_trait::async_trait;

mod delete_bucket_lifecycle;
mod get_bucket_lifecycle;
mod put_bucket_lifecycle;

/// Builds an [`S3Client`] for a given endpoint.
#[derive(Debug)]
pub struct S3ClientBuilder {
    base_url: BaseUrl,
    provider: Option<Arc<dyn Provider>>,
    ignore_cert_check: Option<bool>,
    timeout: Option<Duration>,
    app_info: Option<(String, String)>,
}

impl S3ClientBuilder {
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            provider: None,
            ignore_cert_check: None,
            timeout: None,
            app_info: None,
        }
    }

    /// Set the credential provider. If not set, requests are anonymous.
    pub fn provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set flag to ignore certificate check. This is insecure and should only
    /// be used for testing.
    pub fn ignore_cert_check(mut self, ignore_cert_check: bool) -> Self {
        self.ignore_cert_check = Some(ignore_cert_check);
        self
    }

    /// Total time allowed for one HTTP request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the app info as an (app_name, app_version) pair. This will show up
    /// in the client's user-agent.
    pub fn app_info(mut self, app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        self.app_info = Some((app_name.into(), app_version.into()));
        self
    }

    pub fn build(self) -> Result<S3Client, Error> {
        let mut user_agent = format!(
            "s3-lifecycle ({}; {}) s3-lifecycle-rs/{}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            env!("CARGO_PKG_VERSION")
        );
        if let Some((app_name, app_version)) = self.app_info {
            user_agent.push_str(&format!(" {app_name}/{app_version}"));
        }

        let mut builder = reqwest::Client::builder()
            .no_gzip()
            .user_agent(user_agent);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        #[cfg(any(
            feature = "default-tls",
            feature = "native-tls",
            feature = "rustls-tls"
        ))]
        if let Some(v) = self.ignore_cert_check {
            builder = builder.danger_accept_invalid_certs(v);
        }

        Ok(S3Client {
            http_client: builder.build()?,
            shared: Arc::new(SharedClientItems {
                base_url: self.base_url,
                provider: self.provider,
            }),
        })
    }
}

/// Client for the lifecycle configuration of S3 buckets.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct S3Client {
    http_client: reqwest::Client,
    shared: Arc<SharedClientItems>,
}

#[derive(Debug)]
struct SharedClientItems {
    base_url: BaseUrl,
    provider: Option<Arc<dyn Provider>>,
}

impl S3Client {
    pub fn builder(base_url: BaseUrl) -> S3ClientBuilder {
        S3ClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.shared.base_url
    }

    /// Sends a signed request for a bucket subresource and returns the
    /// response when its status is a success.
    pub(crate) async fn execute(
        &self,
        method: Method,
        bucket: &str,
        expected_owner: Option<&str>,
        query_params: &Multimap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, Error> {
        check_bucket_name(bucket, false)?;
        let base_url = &self.shared.base_url;
        let region = base_url.signing_region();
        let url = base_url.build_url(query_params, bucket);

        let mut headers = Multimap::new();
        headers.add(HOST, url.host_header_value());
        if let Some(owner) = expected_owner {
            headers.add(X_AMZ_EXPECTED_BUCKET_OWNER, owner);
        }

        let sha256 = match &body {
            Some(data) => {
                headers.add(CONTENT_TYPE, "application/xml");
                headers.add(CONTENT_LENGTH, data.len().to_string());
                headers.add(CONTENT_MD5, md5sum_hash(data));
                sha256_hash(data)
            }
            None => EMPTY_SHA256.to_string(),
        };
        headers.add(X_AMZ_CONTENT_SHA256, sha256.clone());

        let date = utc_now();
        headers.add(X_AMZ_DATE, to_amz_date(date));

        if let Some(creds) = self.shared.provider.as_ref().and_then(|p| p.fetch()) {
            if let Some(token) = &creds.session_token {
                headers.add(X_AMZ_SECURITY_TOKEN, token);
            }
            sign_v4_s3(
                &method,
                &url.path,
                region,
                &mut headers,
                query_params,
                &creds.access_key,
                &creds.secret_key,
                &sha256,
                date,
            );
        }

        log::debug!("{method} {url}");
        let mut req = self.http_client.request(method.clone(), url.to_string());
        for (key, values) in headers.iter_all() {
            for value in values {
                req = req.header(key, value);
            }
        }
        if let Some(data) = body {
            req = req.body(data);
        }

        let mut resp = req.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status_code = resp.status().as_u16();
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let e = error_response(body, status_code, headers, &url.path, bucket)?;
        log::debug!("{method} {} failed: {e}", url.path);
        Err(e.into())
    }
}

/// Decodes the error body of a failed request, or derives an error from the
/// status code when the body is empty.
fn error_response(
    body: Bytes,
    http_status_code: u16,
    headers: HeaderMap,
    resource: &str,
    bucket: &str,
) -> Result<S3ErrorResponse, Error> {
    if !body.is_empty() {
        let content_type = headers
            .get(CONTENT_TYPE)
            .map(|v| v.to_str())
            .transpose()
            .map_err(ValidationErr::from)?
            .unwrap_or_default()
            .to_string();

        return if content_type.to_lowercase().contains("xml") {
            Ok(S3ErrorResponse::new_from_body(body, headers)?)
        } else {
            Err(S3ServerError::InvalidServerResponse {
                message: format!("expected content-type 'application/xml', but got {content_type}"),
                http_status_code,
                content_type,
            }
            .into())
        };
    }

    let (code, message) = match http_status_code {
        301 => (S3ErrorCode::PermanentRedirect, "Moved Permanently"),
        307 => (S3ErrorCode::Redirect, "Temporary redirect"),
        400 => (S3ErrorCode::BadRequest, "Bad request"),
        403 => (S3ErrorCode::AccessDenied, "Access denied"),
        404 | 409 => (S3ErrorCode::NoSuchBucket, "Bucket does not exist"),
        405 | 501 => (
            S3ErrorCode::MethodNotAllowed,
            "The specified method is not allowed against this resource",
        ),
        _ => return Err(NetworkError::ServerError(http_status_code).into()),
    };

    let header_text = |name: &str| -> Result<String, Error> {
        Ok(headers
            .get(name)
            .map(|v| v.to_str())
            .transpose()
            .map_err(ValidationErr::from)?
            .unwrap_or_default()
            .to_string())
    };
    let request_id = header_text(X_AMZ_REQUEST_ID)?;
    let host_id = header_text(X_AMZ_ID_2)?;
    let mut message = message.to_string();
    let region = header_text(X_AMZ_BUCKET_REGION)?;
    if matches!(http_status_code, 301 | 307 | 400) && !region.is_empty() {
        message.push_str("; use region ");
        message.push_str(&region);
    }

    Ok(S3ErrorResponse::new(
        headers,
        code,
        Some(message),
        resource.to_string(),
        request_id,
        host_id,
        Some(bucket.to_string()),
    ))
}

#[async_trait]
impl LifecycleApi for S3Client {
    async fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
        config: &LifecycleConfig,
    ) -> Result<(), Error> {
        S3Client::put_bucket_lifecycle(self, bucket, expected_owner, config).await
    }

    async fn get_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<LifecycleConfig, Error> {
        S3Client::get_bucket_lifecycle(self, bucket, expected_owner).await
    }

    async fn delete_bucket_lifecycle(
        &self,
        bucket: &str,
        expected_owner: Option<&str>,
    ) -> Result<(), Error> {
        S3Client::delete_bucket_lifecycle(self, bucket, expected_owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_error_response_from_xml_body() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/xml"));
        let body = Bytes::from_static(
            b"<Error><Code>InvalidArgument</Code>\
            <Message>ExpiredObjectDeleteMarker cannot be specified with tag filters</Message>\
            </Error>",
        );
        let e = error_response(body, 400, headers, "/b1", "b1").unwrap();
        assert_eq!(e.code(), S3ErrorCode::InvalidArgument);
        assert_eq!(
            e.message(),
            Some("ExpiredObjectDeleteMarker cannot be specified with tag filters")
        );
    }

    #[test]
    fn test_error_response_from_status() {
        let e = error_response(Bytes::new(), 404, HeaderMap::new(), "/b1", "b1").unwrap();
        assert_eq!(e.code(), S3ErrorCode::NoSuchBucket);
        assert_eq!(e.bucket_name(), Some("b1"));

        let mut headers = HeaderMap::new();
        headers.insert("x-amz-bucket-region", HeaderValue::from_static("eu-west-1"));
        let e = error_response(Bytes::new(), 301, headers, "/b1", "b1").unwrap();
        assert_eq!(e.message(), Some("Moved Permanently; use region eu-west-1"));

        assert!(matches!(
            error_response(Bytes::new(), 503, HeaderMap::new(), "/b1", "b1"),
            Err(Error::Network(NetworkError::ServerError(503)))
        ));
    }

    #[test]
    fn test_error_response_non_xml_body() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html"));
        assert!(matches!(
            error_response(Bytes::from_static(b"<html/>"), 500, headers, "/b1", "b1"),
            Err(Error::S3Server(S3ServerError::InvalidServerResponse { .. }))
        ));
    }

    #[test]
    fn test_builder() {
        let client = S3Client::builder("http://localhost:9000".parse().unwrap())
            .timeout(Duration::from_secs(5))
            .app_info("test", "1.0")
            .build()
            .unwrap();
        assert!(!client.base_url().https);
    }
}
