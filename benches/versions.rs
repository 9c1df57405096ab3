// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use vellum::format::{export_file, import_file};
use vellum::mapping::{default_module_id, MappingIndex};
use vellum::model::{FileId, NodeId};
use vellum::store::{FileStore, MemoryBackend};
use vellum::version::{FileVersionManager, NewFileParams};

mod fixtures;
mod tuning;

// Benchmark identity (keep stable):
// - Group names in this file: `versions.append`, `versions.needs_save`, `versions.json`,
//   `versions.mapping`
fn manager_with_file(case: fixtures::Case) -> (FileVersionManager<MemoryBackend>, FileId) {
    let mut manager = FileVersionManager::new(FileStore::new(MemoryBackend::new()));
    let mut params = NewFileParams::named("bench");
    params.elements = fixtures::fixture(case);
    let file = manager.store_mut().create_file(params).expect("create file");
    (manager, file.id().clone())
}

fn benches_versions(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("versions.append");

        // Past the cap every append also evicts the oldest version.
        group.bench_function("at_cap", |b| {
            let (mut manager, file_id) = manager_with_file(fixtures::Case::MediumDense);
            let elements = fixtures::fixture(fixtures::Case::MediumDense);
            for _ in 0..12 {
                manager
                    .create_simple_version(&file_id, elements.clone(), None)
                    .expect("warm up");
            }
            b.iter_batched(
                || elements.clone(),
                |elements| {
                    let file = manager
                        .create_simple_version(&file_id, elements, None)
                        .expect("append");
                    black_box(file.simple_versions().len())
                },
                BatchSize::SmallInput,
            )
        });

        group.finish();
    }

    {
        let mut group = c.benchmark_group("versions.needs_save");

        let (manager, file_id) = manager_with_file(fixtures::Case::LargeCyclic);
        let same = fixtures::fixture(fixtures::Case::LargeCyclic);
        let mut moved = same.clone();
        if let Some(last) = moved.last_mut() {
            last.x += 1.0;
        }

        group.bench_function("unchanged", |b| {
            b.iter(|| black_box(manager.needs_save(&file_id, black_box(&same)).expect("check")))
        });
        group.bench_function("changed", |b| {
            b.iter(|| black_box(manager.needs_save(&file_id, black_box(&moved)).expect("check")))
        });

        group.finish();
    }

    {
        let mut group = c.benchmark_group("versions.json");

        let (manager, file_id) = manager_with_file(fixtures::Case::LargeCyclic);
        let file = manager.store().get_file(&file_id).expect("file");
        let raw = export_file(&file).expect("export");

        group.bench_function("export", |b| {
            b.iter(|| black_box(export_file(black_box(&file)).expect("export").len()))
        });
        group.bench_function("import", |b| {
            b.iter(|| black_box(import_file(black_box(&raw)).expect("import").simple_versions().len()))
        });

        group.finish();
    }

    {
        let mut group = c.benchmark_group("versions.mapping");

        let elements = fixtures::fixture(fixtures::Case::LargeCyclic);
        let mut mapping = MappingIndex::new();
        for element in &elements {
            let node_id = NodeId::new(element.id.as_str()).expect("node id");
            mapping.map(element.id.clone(), node_id, default_module_id());
        }
        let stamped = mapping.materialize_into_elements(&elements);

        group.bench_function("materialize", |b| {
            b.iter(|| black_box(mapping.materialize_into_elements(black_box(&elements)).len()))
        });
        group.bench_function("restore", |b| {
            b.iter(|| {
                let mut restored = MappingIndex::new();
                black_box(restored.restore_from_elements(black_box(&stamped)))
            })
        });

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = tuning::criterion();
    targets = benches_versions
}
criterion_main!(benches);
