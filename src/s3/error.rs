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

//! Error definitions for lifecycle operations

use crate::s3::error_response::{S3ErrorCode, S3ErrorResponse};
use thiserror::Error;

/// Errors raised while checking input locally, before anything is sent.
#[derive(Debug, Error)]
pub enum ValidationErr {
    #[error("invalid bucket name '{name}': {reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("lifecycle rule id must be between 1 and 255 characters; got {0} characters")]
    InvalidLifecycleRuleId(usize),

    #[error("lifecycle rule id '{0}' is used by more than one rule")]
    DuplicateRuleId(String),

    #[error("only one of date or days of {0} must be set")]
    InvalidDateAndDays(String),

    #[error("ExpiredObjectDeleteMarker must not be provided along with Date and Days")]
    InvalidExpiredObjectDeleteMarker,

    #[error("rule '{rule_id}' has more than one {kind} for storage class {storage_class}")]
    DuplicateStorageClass {
        rule_id: String,
        kind: &'static str,
        storage_class: String,
    },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("lifecycle configuration must contain at least one rule")]
    EmptyLifecycleConfig,

    #[error("invalid storage class '{0}'")]
    InvalidStorageClass(String),

    #[error("invalid rule status '{0}'; expected Enabled or Disabled")]
    InvalidRuleStatus(String),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("XML error: {0}")]
    XmlError(String),

    #[error("XML parse error: {0}")]
    XmlParseError(#[from] xmltree::ParseError),

    #[error("time parse error: {0}")]
    TimeParseError(#[from] chrono::ParseError),

    #[error("integer parse error: {0}")]
    IntError(#[from] std::num::ParseIntError),

    #[error("header value is not valid ASCII: {0}")]
    StrError(#[from] reqwest::header::ToStrError),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl ValidationErr {
    pub fn xml_error(message: impl Into<String>) -> Self {
        ValidationErr::XmlError(message.into())
    }

    pub fn xml_error_with_source(
        message: impl Into<String>,
        source: impl std::fmt::Display,
    ) -> Self {
        ValidationErr::XmlError(format!("{}: {source}", message.into()))
    }
}

/// Failures reported by, or while talking to, the remote server.
#[derive(Debug, Error)]
pub enum S3ServerError {
    #[error("{0}")]
    S3Error(Box<S3ErrorResponse>),

    #[error(
        "invalid server response; status code: {http_status_code}, content-type: {content_type}: {message}"
    )]
    InvalidServerResponse {
        message: String,
        http_status_code: u16,
        content_type: String,
    },
}

/// Transport level failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("HTTP error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("server failed with HTTP status code {0}")]
    ServerError(u16),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErr),

    #[error("malformed resource id '{id}': {reason}")]
    MalformedId { id: String, reason: String },

    #[error("S3 server error: {0}")]
    S3Server(#[from] S3ServerError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Returns the server error response, if this error came from one.
    pub fn s3_error(&self) -> Option<&S3ErrorResponse> {
        match self {
            Error::S3Server(S3ServerError::S3Error(e)) => Some(e),
            _ => None,
        }
    }

    /// Returns the S3 error code, if this error came from the server.
    pub fn s3_error_code(&self) -> Option<S3ErrorCode> {
        self.s3_error().map(|e| e.code())
    }

    pub fn is_no_such_lifecycle_configuration(&self) -> bool {
        matches!(
            self.s3_error_code(),
            Some(S3ErrorCode::NoSuchLifecycleConfiguration)
        )
    }

    pub fn is_no_such_bucket(&self) -> bool {
        matches!(self.s3_error_code(), Some(S3ErrorCode::NoSuchBucket))
    }

    /// True for errors where the server refused the request contents.
    pub fn is_remote_validation(&self) -> bool {
        self.s3_error_code()
            .is_some_and(|code| code.is_validation_failure())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(NetworkError::ReqwestError(err))
    }
}

impl From<S3ErrorResponse> for Error {
    fn from(err: S3ErrorResponse) -> Self {
        Error::S3Server(S3ServerError::S3Error(Box::new(err)))
    }
}
