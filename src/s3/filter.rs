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

//! Lifecycle rule filters and their normalization.
//!
//! A rule's filter can reach us in several shapes: a legacy rule-level
//! `<Prefix>`, an empty `<Filter>`, a `<Filter>` holding a single condition,
//! or a `<Filter>` holding an `<And>` clause. Servers are not consistent
//! about which shape they return for the same predicate, so every shape is
//! reduced to one canonical [`Filter`] before it is compared or sent.

use crate::s3::error::ValidationErr;
use crate::s3::types::Tag;
use crate::s3::utils::{get_text_option, get_text_result, parse_child, xml_escape};
use std::collections::BTreeMap;
use xmltree::Element;

/// Conjunction of two or more conditions.
///
/// Tags are keyed by tag key, so two operators holding the same tags in a
/// different order are equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AndOperator {
    pub prefix: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub object_size_greater_than: Option<u64>,
    pub object_size_less_than: Option<u64>,
}

impl AndOperator {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_object_size_greater_than(mut self, size: u64) -> Self {
        self.object_size_greater_than = Some(size);
        self
    }

    pub fn with_object_size_less_than(mut self, size: u64) -> Self {
        self.object_size_less_than = Some(size);
        self
    }
}

/// Canonical filter of a lifecycle rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    /// Matches every object in the bucket
    #[default]
    Empty,
    Prefix(String),
    Tag(Tag),
    ObjectSizeGreaterThan(u64),
    ObjectSizeLessThan(u64),
    And(AndOperator),
}

/// `<And>` clause as declared or decoded, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AndBlock {
    pub prefix: Option<String>,
    pub tags: Vec<Tag>,
    pub object_size_greater_than: Option<u64>,
    pub object_size_less_than: Option<u64>,
}

/// `<Filter>` block as declared or decoded, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterBlock {
    pub prefix: Option<String>,
    pub tag: Option<Tag>,
    pub object_size_greater_than: Option<u64>,
    pub object_size_less_than: Option<u64>,
    pub and: Option<AndBlock>,
}

/// Every way a rule can express what it applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFilter {
    /// Deprecated rule-level `<Prefix>`
    pub legacy_prefix: Option<String>,
    pub block: Option<FilterBlock>,
}

/// Reduces any accepted filter shape to its canonical [`Filter`].
///
/// One condition yields the matching single-condition variant, two or more
/// yield [`Filter::And`], none yields [`Filter::Empty`]. An empty prefix is
/// not a condition. Contradicting conditions are rejected.
pub fn normalize(raw: &RawFilter) -> Result<Filter, ValidationErr> {
    let mut conditions = Conditions::default();

    if let Some(prefix) = &raw.legacy_prefix {
        conditions.add_prefix(prefix)?;
    }

    if let Some(block) = &raw.block {
        if let Some(prefix) = &block.prefix {
            conditions.add_prefix(prefix)?;
        }
        if let Some(tag) = &block.tag {
            conditions.add_tag(&tag.key, &tag.value)?;
        }
        if let Some(size) = block.object_size_greater_than {
            conditions.add_greater_than(size)?;
        }
        if let Some(size) = block.object_size_less_than {
            conditions.add_less_than(size)?;
        }
        if let Some(and) = &block.and {
            if let Some(prefix) = &and.prefix {
                conditions.add_prefix(prefix)?;
            }
            for tag in &and.tags {
                conditions.add_tag(&tag.key, &tag.value)?;
            }
            if let Some(size) = and.object_size_greater_than {
                conditions.add_greater_than(size)?;
            }
            if let Some(size) = and.object_size_less_than {
                conditions.add_less_than(size)?;
            }
        }
    }

    Ok(conditions.into_filter())
}

#[derive(Default)]
struct Conditions {
    prefix: Option<String>,
    tags: BTreeMap<String, String>,
    greater_than: Option<u64>,
    less_than: Option<u64>,
}

impl Conditions {
    fn add_prefix(&mut self, prefix: &str) -> Result<(), ValidationErr> {
        if prefix.is_empty() {
            return Ok(());
        }
        match &self.prefix {
            Some(existing) if existing != prefix => Err(ValidationErr::InvalidFilter(format!(
                "conflicting prefixes '{existing}' and '{prefix}'"
            ))),
            _ => {
                self.prefix = Some(prefix.to_string());
                Ok(())
            }
        }
    }

    fn add_tag(&mut self, key: &str, value: &str) -> Result<(), ValidationErr> {
        match self.tags.get(key) {
            Some(existing) if existing != value => Err(ValidationErr::InvalidFilter(format!(
                "tag '{key}' has conflicting values '{existing}' and '{value}'"
            ))),
            _ => {
                self.tags.insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    fn add_greater_than(&mut self, size: u64) -> Result<(), ValidationErr> {
        Self::add_bound(&mut self.greater_than, size, "ObjectSizeGreaterThan")
    }

    fn add_less_than(&mut self, size: u64) -> Result<(), ValidationErr> {
        Self::add_bound(&mut self.less_than, size, "ObjectSizeLessThan")
    }

    fn add_bound(slot: &mut Option<u64>, size: u64, name: &str) -> Result<(), ValidationErr> {
        match slot {
            Some(existing) if *existing != size => Err(ValidationErr::InvalidFilter(format!(
                "conflicting {name} values {existing} and {size}"
            ))),
            _ => {
                *slot = Some(size);
                Ok(())
            }
        }
    }

    fn count(&self) -> usize {
        usize::from(self.prefix.is_some())
            + self.tags.len()
            + usize::from(self.greater_than.is_some())
            + usize::from(self.less_than.is_some())
    }

    fn into_filter(self) -> Filter {
        if self.count() > 1 {
            return Filter::And(AndOperator {
                prefix: self.prefix,
                tags: self.tags,
                object_size_greater_than: self.greater_than,
                object_size_less_than: self.less_than,
            });
        }
        if let Some(prefix) = self.prefix {
            return Filter::Prefix(prefix);
        }
        if let Some((key, value)) = self.tags.into_iter().next() {
            return Filter::Tag(Tag { key, value });
        }
        if let Some(size) = self.greater_than {
            return Filter::ObjectSizeGreaterThan(size);
        }
        if let Some(size) = self.less_than {
            return Filter::ObjectSizeLessThan(size);
        }
        Filter::Empty
    }
}

impl Filter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Filter::Prefix(prefix.into())
    }

    pub fn tag(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Tag(Tag::new(key, value))
    }

    /// Number of conditions this filter holds.
    pub fn condition_count(&self) -> usize {
        match self {
            Filter::Empty => 0,
            Filter::Prefix(p) => usize::from(!p.is_empty()),
            Filter::Tag(_) | Filter::ObjectSizeGreaterThan(_) | Filter::ObjectSizeLessThan(_) => 1,
            Filter::And(and) => {
                usize::from(and.prefix.as_deref().is_some_and(|p| !p.is_empty()))
                    + and.tags.len()
                    + usize::from(and.object_size_greater_than.is_some())
                    + usize::from(and.object_size_less_than.is_some())
            }
        }
    }

    /// Canonical form of this filter.
    ///
    /// A filter built by hand may hold a degenerate `And` with fewer than
    /// two conditions, or an empty prefix; both collapse here.
    pub fn normalized(&self) -> Filter {
        let mut conditions = Conditions::default();
        match self {
            Filter::Empty => {}
            Filter::Prefix(p) => {
                if !p.is_empty() {
                    conditions.prefix = Some(p.clone());
                }
            }
            Filter::Tag(tag) => {
                conditions.tags.insert(tag.key.clone(), tag.value.clone());
            }
            Filter::ObjectSizeGreaterThan(size) => conditions.greater_than = Some(*size),
            Filter::ObjectSizeLessThan(size) => conditions.less_than = Some(*size),
            Filter::And(and) => {
                conditions.prefix = and.prefix.clone().filter(|p| !p.is_empty());
                conditions.tags = and.tags.clone();
                conditions.greater_than = and.object_size_greater_than;
                conditions.less_than = and.object_size_less_than;
            }
        }
        conditions.into_filter()
    }

    /// Decodes a `<Filter>` element into its canonical form.
    pub fn from_xml(element: &Element) -> Result<Filter, ValidationErr> {
        normalize(&RawFilter {
            legacy_prefix: None,
            block: Some(FilterBlock::from_xml(element)?),
        })
    }

    /// Encodes the canonical form of this filter as a `<Filter>` element.
    pub fn to_xml(&self) -> String {
        let mut data = String::from("<Filter>");
        match self.normalized() {
            Filter::Empty => {}
            Filter::Prefix(prefix) => push_prefix(&mut data, &prefix),
            Filter::Tag(tag) => push_tag(&mut data, &tag.key, &tag.value),
            Filter::ObjectSizeGreaterThan(size) => push_greater_than(&mut data, size),
            Filter::ObjectSizeLessThan(size) => push_less_than(&mut data, size),
            Filter::And(and) => {
                data.push_str("<And>");
                if let Some(prefix) = &and.prefix {
                    push_prefix(&mut data, prefix);
                }
                for (key, value) in &and.tags {
                    push_tag(&mut data, key, value);
                }
                if let Some(size) = and.object_size_greater_than {
                    push_greater_than(&mut data, size);
                }
                if let Some(size) = and.object_size_less_than {
                    push_less_than(&mut data, size);
                }
                data.push_str("</And>");
            }
        }
        data.push_str("</Filter>");
        data
    }
}

fn push_prefix(data: &mut String, prefix: &str) {
    data.push_str("<Prefix>");
    data.push_str(&xml_escape(prefix));
    data.push_str("</Prefix>");
}

fn push_tag(data: &mut String, key: &str, value: &str) {
    data.push_str("<Tag><Key>");
    data.push_str(&xml_escape(key));
    data.push_str("</Key><Value>");
    data.push_str(&xml_escape(value));
    data.push_str("</Value></Tag>");
}

fn push_greater_than(data: &mut String, size: u64) {
    data.push_str("<ObjectSizeGreaterThan>");
    data.push_str(&size.to_string());
    data.push_str("</ObjectSizeGreaterThan>");
}

fn push_less_than(data: &mut String, size: u64) {
    data.push_str("<ObjectSizeLessThan>");
    data.push_str(&size.to_string());
    data.push_str("</ObjectSizeLessThan>");
}

fn parse_tag(element: &Element) -> Result<Tag, ValidationErr> {
    Ok(Tag {
        key: get_text_result(element, "Key")?,
        value: get_text_option(element, "Value").unwrap_or_default(),
    })
}

impl FilterBlock {
    pub fn from_xml(element: &Element) -> Result<FilterBlock, ValidationErr> {
        let and = match element.get_child("And") {
            Some(and_elem) => {
                let mut tags = Vec::new();
                for child in and_elem.children.iter().filter_map(|c| c.as_element()) {
                    if child.name == "Tag" {
                        tags.push(parse_tag(child)?);
                    }
                }
                Some(AndBlock {
                    prefix: get_text_option(and_elem, "Prefix"),
                    tags,
                    object_size_greater_than: parse_child(and_elem, "ObjectSizeGreaterThan")?,
                    object_size_less_than: parse_child(and_elem, "ObjectSizeLessThan")?,
                })
            }
            None => None,
        };

        Ok(FilterBlock {
            prefix: get_text_option(element, "Prefix"),
            tag: element.get_child("Tag").map(parse_tag).transpose()?,
            object_size_greater_than: parse_child(element, "ObjectSizeGreaterThan")?,
            object_size_less_than: parse_child(element, "ObjectSizeLessThan")?,
            and,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};

    fn block(f: impl FnOnce(&mut FilterBlock)) -> RawFilter {
        let mut b = FilterBlock::default();
        f(&mut b);
        RawFilter {
            legacy_prefix: None,
            block: Some(b),
        }
    }

    fn and_block(f: impl FnOnce(&mut AndBlock)) -> RawFilter {
        let mut a = AndBlock::default();
        f(&mut a);
        RawFilter {
            legacy_prefix: None,
            block: Some(FilterBlock {
                and: Some(a),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_no_conditions_is_empty() {
        assert_eq!(normalize(&RawFilter::default()).unwrap(), Filter::Empty);
        assert_eq!(normalize(&block(|_| {})).unwrap(), Filter::Empty);
        assert_eq!(normalize(&and_block(|_| {})).unwrap(), Filter::Empty);
        assert_eq!(
            normalize(&block(|b| b.prefix = Some(String::new()))).unwrap(),
            Filter::Empty
        );
    }

    #[test]
    fn test_legacy_prefix() {
        let raw = RawFilter {
            legacy_prefix: Some("path1/".into()),
            block: None,
        };
        assert_eq!(normalize(&raw).unwrap(), Filter::prefix("path1/"));
        assert_eq!(
            normalize(&raw).unwrap(),
            normalize(&block(|b| b.prefix = Some("path1/".into()))).unwrap()
        );
    }

    #[test]
    fn test_single_condition_unwraps_and() {
        assert_eq!(
            normalize(&and_block(|a| a.object_size_greater_than = Some(100))).unwrap(),
            Filter::ObjectSizeGreaterThan(100)
        );
        assert_eq!(
            normalize(&and_block(|a| a.tags.push(Tag::new("key1", "value1")))).unwrap(),
            Filter::tag("key1", "value1")
        );
    }

    #[test]
    fn test_size_range_and_prefix() {
        let raw = block(|b| {
            b.prefix = Some("logs/".into());
            b.object_size_greater_than = Some(500);
            b.object_size_less_than = Some(64000);
        });
        assert_eq!(
            normalize(&raw).unwrap(),
            Filter::And(
                AndOperator::default()
                    .with_prefix("logs/")
                    .with_object_size_greater_than(500)
                    .with_object_size_less_than(64000)
            )
        );
    }

    #[test]
    fn test_conflicting_conditions_rejected() {
        let raw = RawFilter {
            legacy_prefix: Some("a/".into()),
            block: Some(FilterBlock {
                prefix: Some("b/".into()),
                ..Default::default()
            }),
        };
        assert!(matches!(
            normalize(&raw),
            Err(ValidationErr::InvalidFilter(_))
        ));

        let raw = and_block(|a| {
            a.tags.push(Tag::new("k", "v1"));
            a.tags.push(Tag::new("k", "v2"));
        });
        assert!(normalize(&raw).is_err());

        let raw = block(|b| {
            b.object_size_less_than = Some(10);
            b.and = Some(AndBlock {
                object_size_less_than: Some(20),
                ..Default::default()
            });
        });
        assert!(normalize(&raw).is_err());
    }

    #[test]
    fn test_same_condition_twice_is_not_a_conflict() {
        let raw = block(|b| {
            b.prefix = Some("logs/".into());
            b.and = Some(AndBlock {
                prefix: Some("logs/".into()),
                ..Default::default()
            });
        });
        assert_eq!(normalize(&raw).unwrap(), Filter::prefix("logs/"));
    }

    #[test]
    fn test_degenerate_and_collapses() {
        assert_eq!(
            Filter::And(AndOperator::default()).normalized(),
            Filter::Empty
        );
        assert_eq!(
            Filter::And(AndOperator::default().with_prefix("p/")).normalized(),
            Filter::prefix("p/")
        );
        assert_eq!(Filter::prefix("").normalized(), Filter::Empty);
    }

    #[test]
    fn test_from_xml_shapes_agree() {
        let bare = Element::parse(
            "<Filter><ObjectSizeLessThan>500</ObjectSizeLessThan></Filter>".as_bytes(),
        )
        .unwrap();
        let wrapped = Element::parse(
            "<Filter><And><ObjectSizeLessThan>500</ObjectSizeLessThan></And></Filter>".as_bytes(),
        )
        .unwrap();
        assert_eq!(
            Filter::from_xml(&bare).unwrap(),
            Filter::from_xml(&wrapped).unwrap()
        );
        assert_eq!(
            Filter::from_xml(&bare).unwrap(),
            Filter::ObjectSizeLessThan(500)
        );
    }

    #[test]
    fn test_from_xml_and_with_tags() {
        let elem = Element::parse(
            "<Filter><And><Prefix>logs/</Prefix>\
             <Tag><Key>k2</Key><Value>v2</Value></Tag>\
             <Tag><Key>k1</Key><Value>v1</Value></Tag></And></Filter>"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(
            Filter::from_xml(&elem).unwrap(),
            Filter::And(
                AndOperator::default()
                    .with_prefix("logs/")
                    .with_tag("k1", "v1")
                    .with_tag("k2", "v2")
            )
        );
    }

    #[test]
    fn test_from_xml_bad_size() {
        let elem = Element::parse(
            "<Filter><ObjectSizeGreaterThan>big</ObjectSizeGreaterThan></Filter>".as_bytes(),
        )
        .unwrap();
        assert!(Filter::from_xml(&elem).is_err());
    }

    #[test]
    fn test_to_xml() {
        assert_eq!(Filter::Empty.to_xml(), "<Filter></Filter>");
        assert_eq!(
            Filter::And(AndOperator::default().with_prefix("x")).to_xml(),
            "<Filter><Prefix>x</Prefix></Filter>"
        );
        assert_eq!(
            Filter::And(
                AndOperator::default()
                    .with_prefix("a&b/")
                    .with_object_size_greater_than(1)
            )
            .to_xml(),
            "<Filter><And><Prefix>a&amp;b/</Prefix>\
             <ObjectSizeGreaterThan>1</ObjectSizeGreaterThan></And></Filter>"
        );
    }

    #[derive(Clone, Debug)]
    enum Condition {
        Prefix(String),
        Tag(Tag),
        GreaterThan(u64),
        LessThan(u64),
    }

    #[derive(Clone, Debug)]
    struct ConditionSet(Vec<Condition>);

    impl Arbitrary for ConditionSet {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut conditions = Vec::new();
            if bool::arbitrary(g) {
                let name = g.choose(&["logs", "tmp", "a/b", "x"]).copied().unwrap_or("x");
                conditions.push(Condition::Prefix(format!("{name}/")));
            }
            let tag_count = usize::arbitrary(g) % 4;
            for i in 0..tag_count {
                conditions.push(Condition::Tag(Tag::new(
                    format!("key{i}"),
                    format!("value{}", u8::arbitrary(g)),
                )));
            }
            if bool::arbitrary(g) {
                conditions.push(Condition::GreaterThan(u64::from(u32::arbitrary(g))));
            }
            if bool::arbitrary(g) {
                conditions.push(Condition::LessThan(u64::from(u32::arbitrary(g))));
            }
            ConditionSet(conditions)
        }
    }

    fn bare(condition: &Condition) -> RawFilter {
        block(|b| match condition.clone() {
            Condition::Prefix(p) => b.prefix = Some(p),
            Condition::Tag(t) => b.tag = Some(t),
            Condition::GreaterThan(s) => b.object_size_greater_than = Some(s),
            Condition::LessThan(s) => b.object_size_less_than = Some(s),
        })
    }

    fn wrapped(conditions: &[Condition]) -> RawFilter {
        and_block(|a| {
            for condition in conditions.iter().cloned() {
                match condition {
                    Condition::Prefix(p) => a.prefix = Some(p),
                    Condition::Tag(t) => a.tags.push(t),
                    Condition::GreaterThan(s) => a.object_size_greater_than = Some(s),
                    Condition::LessThan(s) => a.object_size_less_than = Some(s),
                }
            }
        })
    }

    quickcheck! {
        fn prop_single_condition_shape_independent(set: ConditionSet) -> bool {
            match set.0.first() {
                Some(condition) => {
                    normalize(&bare(condition)).unwrap()
                        == normalize(&wrapped(std::slice::from_ref(condition))).unwrap()
                }
                None => true,
            }
        }

        fn prop_multi_condition_order_independent(set: ConditionSet) -> bool {
            let forward = normalize(&wrapped(&set.0)).unwrap();
            let mut reversed = set.0.clone();
            reversed.reverse();
            let backward = normalize(&wrapped(&reversed)).unwrap();
            let expected_and = set.0.len() > 1;
            forward == backward
                && matches!(forward, Filter::And(_)) == expected_and
                && forward.condition_count() == set.0.len()
        }

        fn prop_normalized_is_idempotent(set: ConditionSet) -> bool {
            let filter = normalize(&wrapped(&set.0)).unwrap();
            filter.normalized() == filter
        }
    }
}
