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

//! Various utility and helper functions

use crate::s3::error::ValidationErr;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use md5::compute as md5compute;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::str::FromStr;
use xmltree::Element;

/// Date and time with UTC timezone
pub type UtcTime = DateTime<Utc>;

/// SHA256 of an empty payload
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Encodes data using base64 algorithm
pub fn b64encode<T: AsRef<[u8]>>(input: T) -> String {
    BASE64.encode(input)
}

/// Gets hex encoded SHA256 hash of given data
pub fn sha256_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Gets base64 encoded MD5 hash of given data
pub fn md5sum_hash(data: &[u8]) -> String {
    b64encode(md5compute(data).as_slice())
}

/// Gets current UTC time
pub fn utc_now() -> UtcTime {
    chrono::offset::Utc::now()
}

/// Gets signer date value of given time
pub fn to_signer_date(time: UtcTime) -> String {
    time.format("%Y%m%d").to_string()
}

/// Gets AMZ date value of given time
pub fn to_amz_date(time: UtcTime) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Gets ISO8601 UTC formatted value of given time.
///
/// Lifecycle dates are midnight UTC, so the fractional part is omitted.
pub fn to_iso8601utc(time: UtcTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parses ISO8601 UTC formatted value to time
pub fn from_iso8601utc(s: &str) -> Result<UtcTime, ValidationErr> {
    let naive = match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        Ok(d) => d,
        Err(_) => match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ") {
            Ok(d) => d,
            Err(_) => return Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
        },
    };
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Percent-encodes a query component the way S3 expects it
pub fn url_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Validates given bucket name.
pub fn check_bucket_name(bucket_name: &str, strict: bool) -> Result<(), ValidationErr> {
    let invalid = |reason: &str| ValidationErr::InvalidBucketName {
        name: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.trim().is_empty() {
        return Err(invalid("bucket name cannot be empty"));
    }
    if bucket_name.len() < 3 {
        return Err(invalid("bucket name cannot be less than 3 characters"));
    }
    if bucket_name.len() > 63 {
        return Err(invalid("bucket name cannot be greater than 63 characters"));
    }

    lazy_static! {
        static ref IPV4_REGEX: Regex = Regex::new(r"^((25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])$").unwrap();
        static ref VALID_BUCKET_NAME_REGEX: Regex =
            Regex::new("^[A-Za-z0-9][A-Za-z0-9\\.\\-_:]{1,61}[A-Za-z0-9]$").unwrap();
        static ref VALID_BUCKET_NAME_STRICT_REGEX: Regex =
            Regex::new("^[a-z0-9][a-z0-9\\.\\-]{1,61}[a-z0-9]$").unwrap();
    }

    if IPV4_REGEX.is_match(bucket_name) {
        return Err(invalid("bucket name cannot be an IP address"));
    }
    if bucket_name.contains("..") || bucket_name.contains(".-") || bucket_name.contains("-.") {
        return Err(invalid(
            "bucket name contains invalid successive characters '..', '.-' or '-.'",
        ));
    }

    if strict {
        if !VALID_BUCKET_NAME_STRICT_REGEX.is_match(bucket_name) {
            return Err(invalid("bucket name does not follow S3 standards strictly"));
        }
    } else if !VALID_BUCKET_NAME_REGEX.is_match(bucket_name) {
        return Err(invalid("bucket name does not follow S3 standards"));
    }

    Ok(())
}

/// Gets text value of given XML element for given tag.
pub fn get_text_result(element: &Element, tag: &str) -> Result<String, ValidationErr> {
    Ok(element
        .get_child(tag)
        .ok_or(ValidationErr::xml_error(format!("<{tag}> tag not found")))?
        .get_text()
        .unwrap_or_default()
        .to_string())
}

/// Gets optional text value of given XML element for given tag.
pub fn get_text_option(element: &Element, tag: &str) -> Option<String> {
    element
        .get_child(tag)
        .map(|v| v.get_text().unwrap_or_default().to_string())
}

/// Gets text value of given XML element for given tag, or empty string.
pub fn get_text_default(element: &Element, tag: &str) -> String {
    get_text_option(element, tag).unwrap_or_default()
}

/// Parses the optional child `tag` of `element` into `T`.
pub fn parse_child<T>(element: &Element, tag: &str) -> Result<Option<T>, ValidationErr>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_text_option(element, tag) {
        Some(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ValidationErr::xml_error_with_source(format!("invalid <{tag}> value"), e)),
        None => Ok(None),
    }
}

/// Escapes text for inclusion in an XML body.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso8601_roundtrip_midnight() {
        let t = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let s = to_iso8601utc(t);
        assert_eq!(s, "2026-01-15T00:00:00Z");
        assert_eq!(from_iso8601utc(&s).unwrap(), t);
    }

    #[test]
    fn test_iso8601_accepts_fraction_and_offset() {
        let t = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(from_iso8601utc("2026-01-15T00:00:00.000Z").unwrap(), t);
        assert_eq!(from_iso8601utc("2026-01-15T00:00:00+00:00").unwrap(), t);
        assert!(from_iso8601utc("15/01/2026").is_err());
    }

    #[test]
    fn test_check_bucket_name() {
        assert!(check_bucket_name("tf-acc-test-1234", true).is_ok());
        assert!(check_bucket_name("ab", true).is_err());
        assert!(check_bucket_name("192.168.1.1", true).is_err());
        assert!(check_bucket_name("bad..name", true).is_err());
        assert!(check_bucket_name("Upper_Case", true).is_err());
        assert!(check_bucket_name("Upper_Case", false).is_ok());
        assert!(check_bucket_name("with,comma", false).is_err());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
        assert_eq!(xml_escape("logs/"), "logs/");
    }

    #[test]
    fn test_md5sum_hash() {
        assert_eq!(md5sum_hash(b""), "1B2M2Y8AsgTpgAmY7hbvxw==");
    }
}
