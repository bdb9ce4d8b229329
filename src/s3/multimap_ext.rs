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

use crate::s3::utils::url_encode;
use std::collections::BTreeMap;

/// Headers or query parameters of a request, possibly repeated
pub type Multimap = multimap::MultiMap<String, String>;

/// Collapses runs of spaces and trims the value, as SigV4 canonical headers require.
fn collapse_spaces(s: &str) -> String {
    s.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub trait MultimapExt {
    /// Adds a key-value pair to the multimap
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V);

    /// Converts multimap to HTTP query string
    fn to_query_string(&self) -> String;

    /// Converts multimap to canonical query string
    fn get_canonical_query_string(&self) -> String;

    /// Converts multimap to signed headers and canonical headers
    fn get_canonical_headers(&self) -> (String, String);
}

impl MultimapExt for Multimap {
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.insert(key.into(), value.into());
    }

    fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, values) in self.iter_all() {
            for value in values {
                pairs.push(format!("{}={}", url_encode(key), url_encode(value)));
            }
        }
        pairs.join("&")
    }

    fn get_canonical_query_string(&self) -> String {
        let mut sorted: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (key, values) in self.iter_all() {
            let entry = sorted.entry(key.as_str()).or_default();
            entry.extend(values.iter().map(String::as_str));
            entry.sort_unstable();
        }

        let mut pairs = Vec::new();
        for (key, values) in sorted {
            for value in values {
                pairs.push(format!("{}={}", url_encode(key), url_encode(value)));
            }
        }
        pairs.join("&")
    }

    fn get_canonical_headers(&self) -> (String, String) {
        let mut btmap: BTreeMap<String, String> = BTreeMap::new();
        for (k, values) in self.iter_all() {
            let key = k.to_lowercase();
            if key == "authorization" || key == "user-agent" {
                continue;
            }
            let mut vs: Vec<String> = values.iter().map(|v| collapse_spaces(v)).collect();
            vs.sort();
            btmap.insert(key, vs.join(","));
        }

        let signed_headers = btmap.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical_headers = btmap
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join("\n");
        (signed_headers, canonical_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(collapse_spaces("  hello   world "), "hello world");
        assert_eq!(collapse_spaces("application/xml"), "application/xml");
        assert_eq!(collapse_spaces("   "), "");
    }

    #[test]
    fn test_lifecycle_query_string() {
        let mut query = Multimap::new();
        query.add("lifecycle", "");
        assert_eq!(query.to_query_string(), "lifecycle=");
        assert_eq!(query.get_canonical_query_string(), "lifecycle=");
    }

    #[test]
    fn test_canonical_query_string_sorted_and_encoded() {
        let mut query = Multimap::new();
        query.add("b", "x y");
        query.add("a", "2");
        query.add("a", "1");
        assert_eq!(query.get_canonical_query_string(), "a=1&a=2&b=x%20y");
    }

    #[test]
    fn test_canonical_headers_skip_authorization() {
        let mut headers = Multimap::new();
        headers.add("Host", "localhost:9000");
        headers.add("X-Amz-Date", "20260115T000000Z");
        headers.add("Authorization", "secret");
        headers.add("User-Agent", "test");
        let (signed, canonical) = headers.get_canonical_headers();
        assert_eq!(signed, "host;x-amz-date");
        assert_eq!(canonical, "host:localhost:9000\nx-amz-date:20260115T000000Z");
    }
}
