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

//! Endpoint parsing and request URL construction

use crate::s3::error::ValidationErr;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use http::Uri;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Region used for signing when none is known
pub const DEFAULT_REGION: &str = "us-east-1";

lazy_static! {
    static ref AWS_S3_ENDPOINT_REGEX: Regex =
        Regex::new(r"^s3(?:[.-](?P<region>[a-z]{2}(?:-gov)?-[a-z]+-\d))?(?:\.dualstack)?\.amazonaws\.com(?P<cn>\.cn)?$")
            .unwrap();
    static ref AWS_S3_DUALSTACK_REGEX: Regex =
        Regex::new(r"^s3\.dualstack\.(?P<region>[a-z]{2}(?:-gov)?-[a-z]+-\d)\.amazonaws\.com(\.cn)?$")
            .unwrap();
}

#[derive(Clone, Debug)]
pub struct Url {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Multimap,
}

impl Url {
    pub fn host_header_value(&self) -> String {
        if self.port > 0 {
            return format!("{}:{}", self.host, self.port);
        }
        self.host.clone()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(if self.https { "https://" } else { "http://" })?;
        f.write_str(&self.host_header_value())?;
        if !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            f.write_str("?")?;
            f.write_str(&self.query.to_query_string())?;
        }
        Ok(())
    }
}

/// Returns the region encoded in an Amazon S3 endpoint host, if any.
///
/// `None` means the host is not an Amazon S3 endpoint at all; `Some("")` an
/// Amazon endpoint without a region, such as `s3.amazonaws.com`.
fn aws_region_of(host: &str) -> Option<String> {
    let host = host.to_lowercase();
    if let Some(caps) = AWS_S3_DUALSTACK_REGEX.captures(&host) {
        return Some(caps["region"].to_string());
    }
    AWS_S3_ENDPOINT_REGEX.captures(&host).map(|caps| {
        caps.name("region")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    })
}

/// Endpoint of an S3 compatible service.
#[derive(Clone, Debug)]
pub struct BaseUrl {
    pub https: bool,
    host: String,
    port: u16,
    /// Region to sign with; empty means [`DEFAULT_REGION`]
    pub region: String,
    /// Address buckets as `bucket.host` rather than `host/bucket`
    pub virtual_style: bool,
    aws: bool,
}

impl FromStr for BaseUrl {
    type Err = ValidationErr;

    /// Parses an endpoint such as `"http://localhost:9000"` or
    /// `"https://s3.us-west-2.amazonaws.com"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use s3_lifecycle::s3::http::BaseUrl;
    ///
    /// let base_url: BaseUrl = "https://s3.eu-west-1.amazonaws.com".parse().unwrap();
    /// assert_eq!(base_url.region, "eu-west-1");
    /// assert!(base_url.virtual_style);
    ///
    /// let base_url: BaseUrl = "http://127.0.0.1:9000".parse().unwrap();
    /// assert!(!base_url.virtual_style);
    /// ```
    fn from_str(s: &str) -> Result<Self, ValidationErr> {
        let url = s
            .parse::<Uri>()
            .map_err(|e| ValidationErr::InvalidBaseUrl(format!("{s}: {e}")))?;

        let https = match url.scheme_str() {
            None | Some("https") => true,
            Some("http") => false,
            Some(_) => {
                return Err(ValidationErr::InvalidBaseUrl(
                    "scheme must be http or https".into(),
                ));
            }
        };

        let host = url
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ValidationErr::InvalidBaseUrl("valid host must be provided".into()))?;
        let host = if host.parse::<std::net::Ipv6Addr>().is_ok() {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        let mut port = url.port_u16().unwrap_or(0);
        if (https && port == 443) || (!https && port == 80) {
            port = 0;
        }

        if url.path() != "/" && !url.path().is_empty() {
            return Err(ValidationErr::InvalidBaseUrl(
                "path must be empty for base URL".into(),
            ));
        }
        if url.query().is_some() {
            return Err(ValidationErr::InvalidBaseUrl(
                "query must be none for base URL".into(),
            ));
        }

        let aws_region = aws_region_of(&host);
        Ok(BaseUrl {
            https,
            virtual_style: aws_region.is_some() || host.ends_with("aliyuncs.com"),
            aws: aws_region.is_some(),
            region: aws_region.unwrap_or_default(),
            host,
            port,
        })
    }
}

impl BaseUrl {
    /// Checks base URL is AWS host
    pub fn is_aws_host(&self) -> bool {
        self.aws
    }

    /// Region requests are signed for.
    pub fn signing_region(&self) -> &str {
        if self.region.is_empty() {
            DEFAULT_REGION
        } else {
            &self.region
        }
    }

    /// Builds the URL of a bucket-level request.
    ///
    /// Buckets containing `.` use path style over HTTPS, since their virtual
    /// host would not match the endpoint certificate.
    pub fn build_url(&self, query: &Multimap, bucket_name: &str) -> Url {
        let path_style = !self.virtual_style || (bucket_name.contains('.') && self.https);
        let (host, path) = if path_style {
            (self.host.clone(), format!("/{bucket_name}"))
        } else {
            (format!("{bucket_name}.{}", self.host), String::from("/"))
        };
        Url {
            https: self.https,
            host,
            port: self.port,
            path,
            query: query.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifecycle_query() -> Multimap {
        let mut query = Multimap::new();
        query.add("lifecycle", "");
        query
    }

    #[test]
    fn test_parse_local_endpoint() {
        let base: BaseUrl = "http://localhost:9000".parse().unwrap();
        assert!(!base.https);
        assert!(!base.is_aws_host());
        assert_eq!(base.signing_region(), DEFAULT_REGION);

        let url = base.build_url(&lifecycle_query(), "my-bucket");
        assert_eq!(url.to_string(), "http://localhost:9000/my-bucket?lifecycle=");
        assert_eq!(url.host_header_value(), "localhost:9000");
    }

    #[test]
    fn test_parse_aws_endpoints() {
        let base: BaseUrl = "https://s3.us-west-2.amazonaws.com".parse().unwrap();
        assert!(base.is_aws_host());
        assert_eq!(base.region, "us-west-2");
        let url = base.build_url(&lifecycle_query(), "my-bucket");
        assert_eq!(
            url.to_string(),
            "https://my-bucket.s3.us-west-2.amazonaws.com/?lifecycle="
        );

        let base: BaseUrl = "s3.amazonaws.com".parse().unwrap();
        assert!(base.is_aws_host());
        assert_eq!(base.signing_region(), DEFAULT_REGION);

        let base: BaseUrl = "https://s3-eu-west-1.amazonaws.com".parse().unwrap();
        assert_eq!(base.region, "eu-west-1");

        let base: BaseUrl = "https://s3.dualstack.ap-south-1.amazonaws.com".parse().unwrap();
        assert_eq!(base.region, "ap-south-1");
    }

    #[test]
    fn test_dotted_bucket_uses_path_style() {
        let base: BaseUrl = "https://s3.us-east-2.amazonaws.com".parse().unwrap();
        let url = base.build_url(&lifecycle_query(), "my.bucket");
        assert_eq!(url.host, "s3.us-east-2.amazonaws.com");
        assert_eq!(url.path, "/my.bucket");
    }

    #[test]
    fn test_reject_bad_base_urls() {
        assert!("ftp://localhost".parse::<BaseUrl>().is_err());
        assert!("http://localhost:9000/path".parse::<BaseUrl>().is_err());
        assert!("http://localhost:9000/?a=b".parse::<BaseUrl>().is_err());
    }

    #[test]
    fn test_default_ports_dropped() {
        let base: BaseUrl = "https://minio.example.com:443".parse().unwrap();
        let url = base.build_url(&Multimap::new(), "b1b");
        assert_eq!(url.to_string(), "https://minio.example.com/b1b");
    }
}
