// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use vellum::config::LayoutOptions;
use vellum::layout::{apply_layout, compute_layout};
use vellum::model::{ElementKind, FlowDirection};

mod fixtures;
mod tuning;

// Benchmark identity (keep stable):
// - Group names in this file: `layout.compute`, `layout.apply`
// - Case IDs (the string after the `/`) must remain stable across refactors.
fn benches_layout(c: &mut Criterion) {
    let cases = [
        ("small", fixtures::fixture(fixtures::Case::Small)),
        ("medium_dense", fixtures::fixture(fixtures::Case::MediumDense)),
        ("large_cyclic", fixtures::fixture(fixtures::Case::LargeCyclic)),
    ];

    {
        let mut group = c.benchmark_group("layout.compute");

        for (case_id, elements) in cases.clone() {
            let nodes = elements.iter().filter(|element| element.kind != ElementKind::Arrow).count();
            group.throughput(Throughput::Elements(nodes as u64));
            group.bench_function(case_id, move |b| {
                let options = LayoutOptions::default();
                b.iter(|| {
                    let layout = compute_layout(black_box(&elements), black_box(&options));
                    black_box(layout.layers().len().wrapping_add(layout.crossings()))
                })
            });
        }

        let elements = fixtures::fixture(fixtures::Case::MediumDense);
        group.bench_function("medium_dense_lr", move |b| {
            let options = LayoutOptions::default().with_direction(FlowDirection::LeftToRight);
            b.iter(|| black_box(compute_layout(black_box(&elements), &options).nodes().len()))
        });

        group.finish();
    }

    {
        let mut group = c.benchmark_group("layout.apply");

        for (case_id, elements) in cases {
            let layout = compute_layout(&elements, &LayoutOptions::default());
            group.throughput(Throughput::Elements(elements.len() as u64));
            group.bench_function(case_id, move |b| {
                b.iter(|| {
                    let out = apply_layout(black_box(&elements), black_box(&layout));
                    let mut acc = 0u64;
                    for element in &out {
                        acc = acc.wrapping_add(element.x.abs() as u64);
                        acc = acc.wrapping_add(element.y.abs() as u64);
                    }
                    black_box(acc)
                })
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = tuning::criterion();
    targets = benches_layout
}
criterion_main!(benches);
