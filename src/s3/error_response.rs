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

use crate::s3::error::ValidationErr;
use crate::s3::utils::{get_text_default, get_text_option};
use bytes::{Buf, Bytes};
use http::HeaderMap;
use std::convert::Infallible;
use std::str::FromStr;
use xmltree::Element;

/// Error codes returned by the server that the reconciler distinguishes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum S3ErrorCode {
    #[default]
    NoError,
    /// The specified bucket does not exist
    NoSuchBucket,
    /// The bucket has no lifecycle configuration
    NoSuchLifecycleConfiguration,
    AccessDenied,
    /// The request carried an invalid argument, e.g. a rejected filter combination
    InvalidArgument,
    InvalidRequest,
    /// The XML body did not validate against the published schema
    MalformedXML,
    InvalidBucketName,
    PermanentRedirect,
    Redirect,
    BadRequest,
    ResourceNotFound,
    MethodNotAllowed,
    NotImplemented,
    InternalError,
    SlowDown,
    ServiceUnavailable,

    OtherError(String), // catch-all for any code not listed above
}

#[allow(dead_code)]
const ALL_S3_ERROR_CODES: &[S3ErrorCode] = &[
    S3ErrorCode::NoError,
    S3ErrorCode::NoSuchBucket,
    S3ErrorCode::NoSuchLifecycleConfiguration,
    S3ErrorCode::AccessDenied,
    S3ErrorCode::InvalidArgument,
    S3ErrorCode::InvalidRequest,
    S3ErrorCode::MalformedXML,
    S3ErrorCode::InvalidBucketName,
    S3ErrorCode::PermanentRedirect,
    S3ErrorCode::Redirect,
    S3ErrorCode::BadRequest,
    S3ErrorCode::ResourceNotFound,
    S3ErrorCode::MethodNotAllowed,
    S3ErrorCode::NotImplemented,
    S3ErrorCode::InternalError,
    S3ErrorCode::SlowDown,
    S3ErrorCode::ServiceUnavailable,
];

impl S3ErrorCode {
    /// Codes for requests the server refused because of their contents.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            S3ErrorCode::InvalidArgument
                | S3ErrorCode::InvalidRequest
                | S3ErrorCode::MalformedXML
                | S3ErrorCode::InvalidBucketName
                | S3ErrorCode::BadRequest
        )
    }
}

impl FromStr for S3ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "noerror" => S3ErrorCode::NoError,
            "nosuchbucket" => S3ErrorCode::NoSuchBucket,
            "nosuchlifecycleconfiguration" => S3ErrorCode::NoSuchLifecycleConfiguration,
            "accessdenied" => S3ErrorCode::AccessDenied,
            "invalidargument" => S3ErrorCode::InvalidArgument,
            "invalidrequest" => S3ErrorCode::InvalidRequest,
            "malformedxml" => S3ErrorCode::MalformedXML,
            "invalidbucketname" => S3ErrorCode::InvalidBucketName,
            "permanentredirect" => S3ErrorCode::PermanentRedirect,
            "redirect" => S3ErrorCode::Redirect,
            "badrequest" => S3ErrorCode::BadRequest,
            "resourcenotfound" => S3ErrorCode::ResourceNotFound,
            "methodnotallowed" => S3ErrorCode::MethodNotAllowed,
            "notimplemented" => S3ErrorCode::NotImplemented,
            "internalerror" => S3ErrorCode::InternalError,
            "slowdown" => S3ErrorCode::SlowDown,
            "serviceunavailable" => S3ErrorCode::ServiceUnavailable,
            _ => S3ErrorCode::OtherError(s.to_owned()),
        })
    }
}

impl std::fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            S3ErrorCode::NoError => write!(f, "NoError"),
            S3ErrorCode::NoSuchBucket => write!(f, "NoSuchBucket"),
            S3ErrorCode::NoSuchLifecycleConfiguration => {
                write!(f, "NoSuchLifecycleConfiguration")
            }
            S3ErrorCode::AccessDenied => write!(f, "AccessDenied"),
            S3ErrorCode::InvalidArgument => write!(f, "InvalidArgument"),
            S3ErrorCode::InvalidRequest => write!(f, "InvalidRequest"),
            S3ErrorCode::MalformedXML => write!(f, "MalformedXML"),
            S3ErrorCode::InvalidBucketName => write!(f, "InvalidBucketName"),
            S3ErrorCode::PermanentRedirect => write!(f, "PermanentRedirect"),
            S3ErrorCode::Redirect => write!(f, "Redirect"),
            S3ErrorCode::BadRequest => write!(f, "BadRequest"),
            S3ErrorCode::ResourceNotFound => write!(f, "ResourceNotFound"),
            S3ErrorCode::MethodNotAllowed => write!(f, "MethodNotAllowed"),
            S3ErrorCode::NotImplemented => write!(f, "NotImplemented"),
            S3ErrorCode::InternalError => write!(f, "InternalError"),
            S3ErrorCode::SlowDown => write!(f, "SlowDown"),
            S3ErrorCode::ServiceUnavailable => write!(f, "ServiceUnavailable"),
            S3ErrorCode::OtherError(code) => write!(f, "{code}"),
        }
    }
}

/// Error response returned by the server, kept whole so the original
/// diagnostic can be shown to the user.
#[derive(Clone, Debug, Default)]
pub struct S3ErrorResponse {
    code: S3ErrorCode,
    message: Option<String>,
    headers: HeaderMap,
    resource: String,
    request_id: String,
    host_id: String,
    bucket_name: Option<String>,
}

impl S3ErrorResponse {
    pub fn new(
        headers: HeaderMap,
        code: S3ErrorCode,
        message: Option<String>,
        resource: String,
        request_id: String,
        host_id: String,
        bucket_name: Option<String>,
    ) -> Self {
        Self {
            code,
            message,
            headers,
            resource,
            request_id,
            host_id,
            bucket_name,
        }
    }

    /// Builds an error response carrying only a code and message.
    pub fn from_code(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn new_from_body(body: Bytes, headers: HeaderMap) -> Result<Self, ValidationErr> {
        let root = Element::parse(body.reader())?;
        Ok(Self {
            headers,
            code: get_text_default(&root, "Code")
                .parse()
                .unwrap_or(S3ErrorCode::NoError),
            message: get_text_option(&root, "Message"),
            resource: get_text_default(&root, "Resource"),
            request_id: get_text_default(&root, "RequestId"),
            host_id: get_text_default(&root, "HostId"),
            bucket_name: get_text_option(&root, "BucketName"),
        })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
    pub fn code(&self) -> S3ErrorCode {
        self.code.clone()
    }
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
    pub fn resource(&self) -> &str {
        &self.resource
    }
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
    pub fn host_id(&self) -> &str {
        &self.host_id
    }
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }
}

impl std::fmt::Display for S3ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "S3 operation failed; code: {}, message: {}, resource: {}, request_id: {}, host_id: {}, bucket_name: {}",
            self.code,
            self.message.as_deref().unwrap_or_default(),
            self.resource,
            self.request_id,
            self.host_id,
            self.bucket_name.as_deref().unwrap_or_default(),
        )
    }
}

impl std::error::Error for S3ErrorResponse {}
