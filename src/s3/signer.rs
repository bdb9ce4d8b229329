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

//! AWS Signature Version 4 for S3 requests

use crate::s3::header_constants::AUTHORIZATION;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::utils::{UtcTime, sha256_hash, to_amz_date, to_signer_date};
use hex::encode as hexencode;
use hmac::{Hmac, Mac};
use http::Method;
use sha2::Sha256;

const SERVICE_NAME: &str = "s3";

fn hmac_hash(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut hasher =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    hasher.update(data);
    hasher.finalize().into_bytes().to_vec()
}

fn get_scope(date: UtcTime, region: &str) -> String {
    format!(
        "{}/{region}/{SERVICE_NAME}/aws4_request",
        to_signer_date(date)
    )
}

fn get_canonical_request_hash(
    method: &Method,
    uri: &str,
    query_string: &str,
    headers: &str,
    signed_headers: &str,
    content_sha256: &str,
) -> String {
    let canonical_request =
        format!("{method}\n{uri}\n{query_string}\n{headers}\n\n{signed_headers}\n{content_sha256}");
    sha256_hash(canonical_request.as_bytes())
}

fn get_string_to_sign(date: UtcTime, scope: &str, canonical_request_hash: &str) -> String {
    format!(
        "AWS4-HMAC-SHA256\n{}\n{scope}\n{canonical_request_hash}",
        to_amz_date(date)
    )
}

pub(crate) fn get_signing_key(secret_key: &str, date: UtcTime, region: &str) -> Vec<u8> {
    let key = format!("AWS4{secret_key}");
    let date_key = hmac_hash(key.as_bytes(), to_signer_date(date).as_bytes());
    let date_region_key = hmac_hash(&date_key, region.as_bytes());
    let date_region_service_key = hmac_hash(&date_region_key, SERVICE_NAME.as_bytes());
    hmac_hash(&date_region_service_key, b"aws4_request")
}

/// Signs an S3 request in place by adding the `Authorization` header.
///
/// `headers` must already hold every header that is sent, including `Host`,
/// `x-amz-date` and `x-amz-content-sha256`.
#[allow(clippy::too_many_arguments)]
pub fn sign_v4_s3(
    method: &Method,
    uri: &str,
    region: &str,
    headers: &mut Multimap,
    query_params: &Multimap,
    access_key: &str,
    secret_key: &str,
    content_sha256: &str,
    date: UtcTime,
) {
    let scope = get_scope(date, region);
    let (signed_headers, canonical_headers) = headers.get_canonical_headers();
    let canonical_query_string = query_params.get_canonical_query_string();
    let canonical_request_hash = get_canonical_request_hash(
        method,
        uri,
        &canonical_query_string,
        &canonical_headers,
        &signed_headers,
        content_sha256,
    );
    let string_to_sign = get_string_to_sign(date, &scope, &canonical_request_hash);
    let signing_key = get_signing_key(secret_key, date, region);
    let signature = hexencode(hmac_hash(&signing_key, string_to_sign.as_bytes()));

    headers.add(
        AUTHORIZATION,
        format!(
            "AWS4-HMAC-SHA256 Credential={access_key}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::header_constants::{HOST, X_AMZ_CONTENT_SHA256, X_AMZ_DATE};
    use crate::s3::utils::EMPTY_SHA256;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_signing_key_is_stable() {
        let date = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let key = get_signing_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", date, "us-east-1");
        assert_eq!(key.len(), 32);
        assert_eq!(
            key,
            get_signing_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", date, "us-east-1")
        );
        assert_ne!(
            key,
            get_signing_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", date, "us-west-2")
        );
    }

    #[test]
    fn test_sign_adds_authorization() {
        let date = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let mut headers = Multimap::new();
        headers.add(HOST, "localhost:9000");
        headers.add(X_AMZ_DATE, to_amz_date(date));
        headers.add(X_AMZ_CONTENT_SHA256, EMPTY_SHA256);
        let mut query = Multimap::new();
        query.add("lifecycle", "");

        sign_v4_s3(
            &Method::GET,
            "/my-bucket",
            "us-east-1",
            &mut headers,
            &query,
            "minioadmin",
            "minioadmin",
            EMPTY_SHA256,
            date,
        );

        let auth = headers.get(AUTHORIZATION).unwrap();
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=minioadmin/20260115/us-east-1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature="
        ));
        let signature = auth.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);
    }
}
