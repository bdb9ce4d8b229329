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

use criterion::{Criterion, criterion_group, criterion_main};
use s3_lifecycle::s3::filter::{AndBlock, Filter, FilterBlock, RawFilter, normalize};
use s3_lifecycle::s3::lifecycle_config::{Expiration, LifecycleRule};
use s3_lifecycle::s3::plan::diff;
use s3_lifecycle::s3::types::Tag;
use std::hint::black_box;

fn rules(count: usize, days: u32) -> Vec<LifecycleRule> {
    (0..count)
        .map(|i| LifecycleRule {
            id: format!("rule-{i}"),
            filter: Filter::prefix(format!("logs/{i}/")),
            expiration: Some(Expiration::days(days + i as u32)),
            ..Default::default()
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let raw = RawFilter {
        legacy_prefix: None,
        block: Some(FilterBlock {
            and: Some(AndBlock {
                prefix: Some("tmp/".to_string()),
                tags: vec![Tag::new("team", "storage"), Tag::new("env", "dev")],
                object_size_greater_than: Some(1024),
                object_size_less_than: None,
            }),
            ..Default::default()
        }),
    };
    c.bench_function("normalize and filter", |b| {
        b.iter(|| normalize(black_box(&raw)))
    });
}

fn bench_diff(c: &mut Criterion) {
    let desired = rules(100, 30);
    let observed = rules(100, 31);
    c.bench_function("diff 100 rules unchanged", |b| {
        b.iter(|| diff(black_box(&desired), black_box(&desired)))
    });
    c.bench_function("diff 100 rules modified", |b| {
        b.iter(|| diff(black_box(&desired), black_box(&observed)))
    });
}

criterion_group!(benches, bench_normalize, bench_diff);
criterion_main!(benches);
