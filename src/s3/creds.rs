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

//! Credential providers

use std::fmt;

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Source of credentials used to sign requests.
///
/// `fetch` returns `None` when no credentials are available, in which case
/// requests are sent unsigned.
pub trait Provider: fmt::Debug + Send + Sync {
    fn fetch(&self) -> Option<Credentials>;
}

#[derive(Clone, Debug)]
pub struct StaticProvider {
    creds: Credentials,
}

impl StaticProvider {
    /// Returns a static provider with given access key, secret key and optional session token
    ///
    /// # Examples
    ///
    /// ```
    /// use s3_lifecycle::s3::creds::StaticProvider;
    /// let provider = StaticProvider::new("minioadmin", "minio123", None);
    /// ```
    pub fn new(access_key: &str, secret_key: &str, session_token: Option<&str>) -> StaticProvider {
        StaticProvider {
            creds: Credentials {
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
                session_token: session_token.map(|v| v.to_string()),
            },
        }
    }
}

impl Provider for StaticProvider {
    fn fetch(&self) -> Option<Credentials> {
        Some(self.creds.clone())
    }
}

/// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
/// `AWS_SESSION_TOKEN` on every fetch.
#[derive(Clone, Debug, Default)]
pub struct EnvProvider;

impl Provider for EnvProvider {
    fn fetch(&self) -> Option<Credentials> {
        let access_key = std::env::var(ENV_ACCESS_KEY_ID).ok()?;
        let secret_key = std::env::var(ENV_SECRET_ACCESS_KEY).ok()?;
        if access_key.is_empty() || secret_key.is_empty() {
            return None;
        }
        Some(Credentials {
            access_key,
            secret_key,
            session_token: std::env::var(ENV_SESSION_TOKEN)
                .ok()
                .filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider() {
        let creds = StaticProvider::new("ak", "sk", Some("token")).fetch().unwrap();
        assert_eq!(creds.access_key, "ak");
        assert_eq!(creds.secret_key, "sk");
        assert_eq!(creds.session_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = StaticProvider::new("ak", "very-secret", Some("tok"))
            .fetch()
            .unwrap();
        let out = format!("{creds:?}");
        assert!(out.contains("ak"));
        assert!(!out.contains("very-secret"));
        assert!(!out.contains("tok\""));
    }
}
