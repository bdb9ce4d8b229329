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

//! Lifecycle rule model and its XML representation

use crate::s3::error::ValidationErr;
use crate::s3::filter::{Filter, FilterBlock, RawFilter, normalize};
use crate::s3::types::{RuleStatus, StorageClass};
use crate::s3::utils::{
    UtcTime, from_iso8601utc, get_text_option, parse_child, to_iso8601utc, xml_escape,
};
use std::collections::HashSet;
use xmltree::Element;

/// Maximum length of a rule id, in characters
pub const MAX_RULE_ID_LEN: usize = 255;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct AbortIncompleteMultipartUpload {
    pub days_after_initiation: u32,
}

/// Expiration action for current object versions.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Expiration {
    pub days: Option<u32>,
    pub date: Option<UtcTime>,
    pub expired_object_delete_marker: Option<bool>,
}

impl Expiration {
    pub fn days(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Default::default()
        }
    }

    pub fn date(date: UtcTime) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn expired_object_delete_marker() -> Self {
        Self {
            expired_object_delete_marker: Some(true),
            ..Default::default()
        }
    }

    /// A false delete marker next to days or date is dropped. Otherwise the
    /// expiration is kept as declared, including an empty one.
    fn canonical(&self) -> Expiration {
        let mut canonical = self.clone();
        if canonical.days.is_some() || canonical.date.is_some() {
            canonical.expired_object_delete_marker =
                canonical.expired_object_delete_marker.filter(|m| *m);
        }
        canonical
    }

    fn validate(&self) -> Result<(), ValidationErr> {
        if self.days.is_some() && self.date.is_some() {
            return Err(ValidationErr::InvalidDateAndDays("expiration".into()));
        }
        if self.expired_object_delete_marker == Some(true)
            && (self.days.is_some() || self.date.is_some())
        {
            return Err(ValidationErr::InvalidExpiredObjectDeleteMarker);
        }
        Ok(())
    }
}

/// Transition of current object versions to another storage class.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Transition {
    pub days: Option<u32>,
    pub date: Option<UtcTime>,
    pub storage_class: StorageClass,
}

impl Transition {
    pub fn after_days(days: u32, storage_class: StorageClass) -> Self {
        Self {
            days: Some(days),
            date: None,
            storage_class,
        }
    }

    pub fn on_date(date: UtcTime, storage_class: StorageClass) -> Self {
        Self {
            days: None,
            date: Some(date),
            storage_class,
        }
    }

    fn canonical(&self) -> Transition {
        let mut t = self.clone();
        if t.days.is_none() && t.date.is_none() {
            t.days = Some(0);
        }
        t
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct NoncurrentVersionExpiration {
    pub noncurrent_days: u32,
    pub newer_noncurrent_versions: Option<u32>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct NoncurrentVersionTransition {
    pub noncurrent_days: u32,
    pub newer_noncurrent_versions: Option<u32>,
    pub storage_class: StorageClass,
}

/// A single lifecycle rule.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct LifecycleRule {
    pub id: String,
    pub status: RuleStatus,
    pub filter: Filter,
    pub abort_incomplete_multipart_upload: Option<AbortIncompleteMultipartUpload>,
    pub expiration: Option<Expiration>,
    pub transitions: Vec<Transition>,
    pub noncurrent_version_expiration: Option<NoncurrentVersionExpiration>,
    pub noncurrent_version_transitions: Vec<NoncurrentVersionTransition>,
}

impl LifecycleRule {
    pub fn validate(&self) -> Result<(), ValidationErr> {
        let id_len = self.id.chars().count();
        if id_len == 0 || id_len > MAX_RULE_ID_LEN {
            return Err(ValidationErr::InvalidLifecycleRuleId(id_len));
        }

        if let Some(expiration) = &self.expiration {
            expiration.validate()?;
        }

        let mut seen = HashSet::new();
        for t in &self.transitions {
            if t.days.is_some() && t.date.is_some() {
                return Err(ValidationErr::InvalidDateAndDays(format!(
                    "transition to {}",
                    t.storage_class
                )));
            }
            if !seen.insert(&t.storage_class) {
                return Err(ValidationErr::DuplicateStorageClass {
                    rule_id: self.id.clone(),
                    kind: "transition",
                    storage_class: t.storage_class.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for t in &self.noncurrent_version_transitions {
            if !seen.insert(&t.storage_class) {
                return Err(ValidationErr::DuplicateStorageClass {
                    rule_id: self.id.clone(),
                    kind: "noncurrent version transition",
                    storage_class: t.storage_class.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Returns the form used for comparison and for writing.
    ///
    /// The filter is normalized and transitions are ordered by storage class.
    /// A transition with neither days nor date gets `days = 0`.
    pub fn canonical(&self) -> LifecycleRule {
        let mut transitions: Vec<Transition> =
            self.transitions.iter().map(Transition::canonical).collect();
        transitions.sort_by(|a, b| a.storage_class.cmp(&b.storage_class));

        let mut noncurrent_version_transitions = self.noncurrent_version_transitions.clone();
        noncurrent_version_transitions.sort_by(|a, b| a.storage_class.cmp(&b.storage_class));

        LifecycleRule {
            id: self.id.clone(),
            status: self.status,
            filter: self.filter.normalized(),
            abort_incomplete_multipart_upload: self.abort_incomplete_multipart_upload,
            expiration: self.expiration.as_ref().map(Expiration::canonical),
            transitions,
            noncurrent_version_expiration: self.noncurrent_version_expiration,
            noncurrent_version_transitions,
        }
    }

    pub fn from_xml(rule_elem: &Element) -> Result<LifecycleRule, ValidationErr> {
        let status = get_text_option(rule_elem, "Status")
            .ok_or(ValidationErr::xml_error("missing <Status> element in <Rule>"))?
            .parse()?;

        let filter = normalize(&RawFilter {
            legacy_prefix: get_text_option(rule_elem, "Prefix"),
            block: rule_elem
                .get_child("Filter")
                .map(FilterBlock::from_xml)
                .transpose()?,
        })?;

        let abort_incomplete_multipart_upload =
            match rule_elem.get_child("AbortIncompleteMultipartUpload") {
                Some(elem) => parse_child(elem, "DaysAfterInitiation")?.map(|days| {
                    AbortIncompleteMultipartUpload {
                        days_after_initiation: days,
                    }
                }),
                None => None,
            };

        let expiration = match rule_elem.get_child("Expiration") {
            Some(elem) => Some(Expiration {
                days: parse_child(elem, "Days")?,
                date: parse_date(elem)?,
                expired_object_delete_marker: parse_child(elem, "ExpiredObjectDeleteMarker")?,
            }),
            None => None,
        };

        let noncurrent_version_expiration =
            match rule_elem.get_child("NoncurrentVersionExpiration") {
                Some(elem) => Some(NoncurrentVersionExpiration {
                    noncurrent_days: parse_child(elem, "NoncurrentDays")?.unwrap_or_default(),
                    newer_noncurrent_versions: parse_child(elem, "NewerNoncurrentVersions")?,
                }),
                None => None,
            };

        let mut transitions = Vec::new();
        let mut noncurrent_version_transitions = Vec::new();
        for child in rule_elem.children.iter().filter_map(|c| c.as_element()) {
            match child.name.as_str() {
                "Transition" => transitions.push(Transition {
                    days: parse_child(child, "Days")?,
                    date: parse_date(child)?,
                    storage_class: parse_storage_class(child)?,
                }),
                "NoncurrentVersionTransition" => {
                    noncurrent_version_transitions.push(NoncurrentVersionTransition {
                        noncurrent_days: parse_child(child, "NoncurrentDays")?.unwrap_or_default(),
                        newer_noncurrent_versions: parse_child(child, "NewerNoncurrentVersions")?,
                        storage_class: parse_storage_class(child)?,
                    })
                }
                _ => {}
            }
        }

        Ok(LifecycleRule {
            id: get_text_option(rule_elem, "ID").unwrap_or_default(),
            status,
            filter,
            abort_incomplete_multipart_upload,
            expiration,
            transitions,
            noncurrent_version_expiration,
            noncurrent_version_transitions,
        })
    }

    fn push_xml(&self, data: &mut String) {
        data.push_str("<Rule>");

        data.push_str("<ID>");
        data.push_str(&xml_escape(&self.id));
        data.push_str("</ID>");

        data.push_str(&self.filter.to_xml());

        data.push_str("<Status>");
        data.push_str(self.status.as_str());
        data.push_str("</Status>");

        for t in &self.transitions {
            data.push_str("<Transition>");
            if let Some(date) = t.date {
                push_element(data, "Date", &to_iso8601utc(date));
            }
            if let Some(days) = t.days {
                push_element(data, "Days", &days.to_string());
            }
            push_element(data, "StorageClass", t.storage_class.as_str());
            data.push_str("</Transition>");
        }

        for t in &self.noncurrent_version_transitions {
            data.push_str("<NoncurrentVersionTransition>");
            push_element(data, "NoncurrentDays", &t.noncurrent_days.to_string());
            if let Some(versions) = t.newer_noncurrent_versions {
                push_element(data, "NewerNoncurrentVersions", &versions.to_string());
            }
            push_element(data, "StorageClass", t.storage_class.as_str());
            data.push_str("</NoncurrentVersionTransition>");
        }

        if let Some(expiration) = &self.expiration {
            data.push_str("<Expiration>");
            if let Some(date) = expiration.date {
                push_element(data, "Date", &to_iso8601utc(date));
            }
            if let Some(days) = expiration.days {
                push_element(data, "Days", &days.to_string());
            }
            if let Some(marker) = expiration.expired_object_delete_marker {
                push_element(data, "ExpiredObjectDeleteMarker", &marker.to_string());
            }
            data.push_str("</Expiration>");
        }

        if let Some(nve) = &self.noncurrent_version_expiration {
            data.push_str("<NoncurrentVersionExpiration>");
            push_element(data, "NoncurrentDays", &nve.noncurrent_days.to_string());
            if let Some(versions) = nve.newer_noncurrent_versions {
                push_element(data, "NewerNoncurrentVersions", &versions.to_string());
            }
            data.push_str("</NoncurrentVersionExpiration>");
        }

        if let Some(abort) = &self.abort_incomplete_multipart_upload {
            data.push_str("<AbortIncompleteMultipartUpload>");
            push_element(
                data,
                "DaysAfterInitiation",
                &abort.days_after_initiation.to_string(),
            );
            data.push_str("</AbortIncompleteMultipartUpload>");
        }

        data.push_str("</Rule>");
    }
}

fn push_element(data: &mut String, tag: &str, value: &str) {
    data.push('<');
    data.push_str(tag);
    data.push('>');
    data.push_str(&xml_escape(value));
    data.push_str("</");
    data.push_str(tag);
    data.push('>');
}

fn parse_date(elem: &Element) -> Result<Option<UtcTime>, ValidationErr> {
    get_text_option(elem, "Date")
        .map(|text| from_iso8601utc(text.trim()))
        .transpose()
}

fn parse_storage_class(elem: &Element) -> Result<StorageClass, ValidationErr> {
    get_text_option(elem, "StorageClass")
        .ok_or(ValidationErr::xml_error(format!(
            "missing <StorageClass> in <{}>",
            elem.name
        )))?
        .parse()
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
/// Lifecycle configuration
pub struct LifecycleConfig {
    pub rules: Vec<LifecycleRule>,
}

impl LifecycleConfig {
    pub fn new(rules: Vec<LifecycleRule>) -> Self {
        Self { rules }
    }

    pub fn from_xml(root: &Element) -> Result<LifecycleConfig, ValidationErr> {
        let mut rules = Vec::new();
        for rule_elem in root.children.iter().filter_map(|c| c.as_element()) {
            if rule_elem.name == "Rule" {
                rules.push(LifecycleRule::from_xml(rule_elem)?);
            }
        }
        Ok(LifecycleConfig { rules })
    }

    /// Checks every rule, and that rule ids are unique.
    pub fn validate(&self) -> Result<(), ValidationErr> {
        if self.rules.is_empty() {
            return Err(ValidationErr::EmptyLifecycleConfig);
        }

        let mut ids = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !ids.insert(rule.id.as_str()) {
                return Err(ValidationErr::DuplicateRuleId(rule.id.clone()));
            }
        }
        Ok(())
    }

    pub fn canonical(&self) -> LifecycleConfig {
        LifecycleConfig {
            rules: self.rules.iter().map(LifecycleRule::canonical).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut data = String::from("<LifecycleConfiguration>");
        for rule in &self.rules {
            rule.push_xml(&mut data);
        }
        data.push_str("</LifecycleConfiguration>");
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::filter::AndOperator;
    use chrono::{TimeZone, Utc};

    fn parse(xml: &str) -> LifecycleConfig {
        LifecycleConfig::from_xml(&Element::parse(xml.as_bytes()).unwrap()).unwrap()
    }

    fn rule(id: &str) -> LifecycleRule {
        LifecycleRule {
            id: id.to_string(),
            expiration: Some(Expiration::days(365)),
            ..Default::default()
        }
    }

    #[test]
    fn test_legacy_prefix_matches_filter_prefix() {
        let legacy = parse(
            "<LifecycleConfiguration><Rule><ID>id1</ID><Prefix>path1/</Prefix>\
             <Status>Enabled</Status><Expiration><Days>365</Days></Expiration>\
             </Rule></LifecycleConfiguration>",
        );
        let filtered = parse(
            "<LifecycleConfiguration><Rule><ID>id1</ID>\
             <Filter><Prefix>path1/</Prefix></Filter>\
             <Status>Enabled</Status><Expiration><Days>365</Days></Expiration>\
             </Rule></LifecycleConfiguration>",
        );
        assert_eq!(legacy, filtered);
        assert_eq!(legacy.rules[0].filter, Filter::prefix("path1/"));
    }

    #[test]
    fn test_multiple_transitions_decoded() {
        let config = parse(
            "<LifecycleConfiguration><Rule><ID>id1</ID><Filter></Filter>\
             <Status>Enabled</Status>\
             <Transition><Days>60</Days><StorageClass>GLACIER</StorageClass></Transition>\
             <Transition><Days>30</Days><StorageClass>STANDARD_IA</StorageClass></Transition>\
             <NoncurrentVersionTransition><NoncurrentDays>30</NoncurrentDays>\
             <StorageClass>STANDARD_IA</StorageClass></NoncurrentVersionTransition>\
             </Rule></LifecycleConfiguration>",
        );
        let rule = &config.rules[0];
        assert_eq!(rule.filter, Filter::Empty);
        assert_eq!(rule.transitions.len(), 2);
        assert_eq!(rule.noncurrent_version_transitions.len(), 1);

        let canonical = rule.canonical();
        assert_eq!(
            canonical.transitions[0],
            Transition::after_days(60, StorageClass::Glacier)
        );
        assert_eq!(
            canonical.transitions[1],
            Transition::after_days(30, StorageClass::StandardIa)
        );
    }

    #[test]
    fn test_storage_class_only_transition_reads_as_zero_days() {
        let config = parse(
            "<LifecycleConfiguration><Rule><ID>id1</ID><Status>Enabled</Status>\
             <Transition><StorageClass>INTELLIGENT_TIERING</StorageClass></Transition>\
             </Rule></LifecycleConfiguration>",
        );
        let canonical = config.canonical();
        assert_eq!(
            canonical.rules[0].transitions,
            vec![Transition::after_days(0, StorageClass::IntelligentTiering)]
        );
    }

    #[test]
    fn test_canonical_keeps_declared_expiration() {
        let mut r = rule("id1");
        let marker_off = Expiration {
            expired_object_delete_marker: Some(false),
            ..Default::default()
        };
        r.expiration = Some(marker_off.clone());
        assert_eq!(r.canonical().expiration, Some(marker_off));

        r.expiration = Some(Expiration::default());
        assert_eq!(r.canonical().expiration, Some(Expiration::default()));

        r.expiration = Some(Expiration {
            days: Some(30),
            date: None,
            expired_object_delete_marker: Some(false),
        });
        assert_eq!(r.canonical().expiration, Some(Expiration::days(30)));
    }

    #[test]
    fn test_marker_only_expiration_is_written() {
        let mut r = rule("r1");
        r.expiration = Some(Expiration {
            expired_object_delete_marker: Some(false),
            ..Default::default()
        });
        let config = LifecycleConfig::new(vec![r]).canonical();
        let xml = config.to_xml();
        assert!(xml.contains(
            "<Expiration><ExpiredObjectDeleteMarker>false</ExpiredObjectDeleteMarker></Expiration>"
        ));
        assert_eq!(parse(&xml).canonical(), config);
    }

    #[test]
    fn test_empty_expiration_block_round_trips() {
        let mut r = rule("r1");
        r.expiration = Some(Expiration::default());
        let config = LifecycleConfig::new(vec![r]).canonical();
        let xml = config.to_xml();
        assert!(xml.contains("<Expiration></Expiration>"));

        let decoded = parse(&xml).canonical();
        assert_eq!(decoded, config);
        assert_eq!(decoded.rules[0].expiration, Some(Expiration::default()));
    }

    #[test]
    fn test_missing_status_is_error() {
        let elem = Element::parse(
            "<LifecycleConfiguration><Rule><ID>id1</ID></Rule></LifecycleConfiguration>"
                .as_bytes(),
        )
        .unwrap();
        assert!(LifecycleConfig::from_xml(&elem).is_err());
    }

    #[test]
    fn test_validate_rule_id() {
        assert!(matches!(
            rule("").validate(),
            Err(ValidationErr::InvalidLifecycleRuleId(0))
        ));
        assert!(rule(&"a".repeat(255)).validate().is_ok());
        assert!(matches!(
            rule(&"a".repeat(256)).validate(),
            Err(ValidationErr::InvalidLifecycleRuleId(256))
        ));
    }

    #[test]
    fn test_validate_expiration() {
        let date = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let mut r = rule("id1");
        r.expiration = Some(Expiration {
            days: Some(1),
            date: Some(date),
            expired_object_delete_marker: None,
        });
        assert!(matches!(
            r.validate(),
            Err(ValidationErr::InvalidDateAndDays(_))
        ));

        r.expiration = Some(Expiration {
            days: Some(1),
            date: None,
            expired_object_delete_marker: Some(true),
        });
        assert!(matches!(
            r.validate(),
            Err(ValidationErr::InvalidExpiredObjectDeleteMarker)
        ));

        r.expiration = Some(Expiration {
            days: Some(1),
            date: None,
            expired_object_delete_marker: Some(false),
        });
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicates() {
        let mut r = rule("id1");
        r.transitions = vec![
            Transition::after_days(30, StorageClass::Glacier),
            Transition::after_days(60, StorageClass::Glacier),
        ];
        assert!(matches!(
            r.validate(),
            Err(ValidationErr::DuplicateStorageClass { .. })
        ));

        let config = LifecycleConfig::new(vec![rule("same"), rule("same")]);
        assert!(matches!(
            config.validate(),
            Err(ValidationErr::DuplicateRuleId(id)) if id == "same"
        ));

        assert!(matches!(
            LifecycleConfig::default().validate(),
            Err(ValidationErr::EmptyLifecycleConfig)
        ));
    }

    #[test]
    fn test_to_xml_decodes_to_same_canonical_config() {
        let date = Utc.with_ymd_and_hms(2030, 1, 15, 0, 0, 0).unwrap();
        let config = LifecycleConfig::new(vec![
            LifecycleRule {
                id: "logs & temp".into(),
                status: RuleStatus::Disabled,
                filter: Filter::And(
                    AndOperator::default()
                        .with_prefix("logs/")
                        .with_tag("k1", "v1")
                        .with_object_size_greater_than(500),
                ),
                abort_incomplete_multipart_upload: Some(AbortIncompleteMultipartUpload {
                    days_after_initiation: 7,
                }),
                expiration: Some(Expiration::date(date)),
                transitions: vec![
                    Transition::on_date(date, StorageClass::Glacier),
                    Transition {
                        days: None,
                        date: None,
                        storage_class: StorageClass::Other("WARM".into()),
                    },
                ],
                noncurrent_version_expiration: Some(NoncurrentVersionExpiration {
                    noncurrent_days: 90,
                    newer_noncurrent_versions: Some(2),
                }),
                noncurrent_version_transitions: vec![NoncurrentVersionTransition {
                    noncurrent_days: 0,
                    newer_noncurrent_versions: None,
                    storage_class: StorageClass::IntelligentTiering,
                }],
            },
            LifecycleRule {
                id: "marker".into(),
                expiration: Some(Expiration::expired_object_delete_marker()),
                ..Default::default()
            },
        ]);

        let decoded = parse(&config.to_xml());
        assert_eq!(decoded.canonical(), config.canonical());
    }
}
