// SPDX-License-Identifier: MPL-2.0
use std::hint::black_box;

extern crate criterion;
use self::criterion::*;

use package_versions::{parse_dependency, ConflictPolicy, VersionRange};

const SELECTIONS: [&str; 8] = [
    "==*",
    "==3",
    "==2.*",
    "<=2.5,>1",
    ">=1.3,<2.0",
    "_>=1.2,<2",
    ">= 0.9 , < 1.7 , <= 1.5",
    "<4.4",
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("selections");

    group.bench_function("parse", |b| {
        b.iter(|| {
            for s in SELECTIONS {
                let _ = black_box(s).parse::<VersionRange>();
            }
        })
    });

    let ranges: Vec<VersionRange> = SELECTIONS
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();
    group.bench_function("intersect", |b| {
        b.iter(|| {
            for left in &ranges {
                for right in &ranges {
                    let _ = black_box(left.intersection(right, ConflictPolicy::Silent));
                }
            }
        })
    });

    group.bench_function("dependency", |b| {
        b.iter(|| parse_dependency(black_box("numpy>=1.13,<2.0  # scientific")))
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
