// Copyright 2025 eraflo
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

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tabula_core::layout::{ScalarKind, VectorType};
use tabula_data::frame::{DataFrame, MonotonicIndex};

const ROWS: usize = 10_000;

fn bench_frame(c: &mut Criterion) {
    let mut frame = DataFrame::builder(MonotonicIndex::new(ROWS))
        .dense("height", ScalarKind::Float32)
        .sparse("velocity", VectorType::new(ScalarKind::Float32, 2))
        .build();
    let height = frame.aspect_field("height").unwrap();
    let velocity = frame.aspect_field("velocity").unwrap();
    let velocity_id = frame.aspect_id("velocity").unwrap();

    // Every third row moves.
    for ordinal in 0..ROWS as u32 {
        let mut row = frame.get_mut(ordinal);
        row.write(height, ordinal as f32);
        if ordinal % 3 == 0 {
            row.write(velocity, [1.0f32, 0.5]);
        }
    }

    let mut group = c.benchmark_group("Frame Access");

    group.bench_function("Dense scan", |b| {
        b.iter(|| {
            let mut total = 0.0f32;
            for row in frame.rows() {
                total += row.read::<f32>(height).unwrap_or_default();
            }
            black_box(total);
        });
    });

    group.bench_function("Sparse scan", |b| {
        b.iter(|| {
            let mut total = 0.0f32;
            for row in frame.sparse_rows(velocity_id) {
                if let Some([x, y]) = row.read::<[f32; 2]>(velocity) {
                    total += x + y;
                }
            }
            black_box(total);
        });
    });

    group.bench_function("Dense walk (write)", |b| {
        b.iter(|| {
            let mut walk = frame.walk_mut();
            while let Some(row) = walk.next_row() {
                let value = row.read::<f32>(height).unwrap_or_default();
                row.write(height, value + 1.0);
            }
        });
    });

    group.finish();
}

fn bench_compaction(c: &mut Criterion) {
    c.bench_function("Sparse churn + compact", |b| {
        b.iter(|| {
            let mut frame = DataFrame::builder(MonotonicIndex::new(ROWS))
                .sparse("tag", ScalarKind::Uint32)
                .build();
            let tag = frame.aspect_field("tag").unwrap();
            let tag_id = frame.aspect_id("tag").unwrap();
            for ordinal in 0..ROWS as u32 {
                frame.get_mut(ordinal).write(tag, ordinal);
            }
            for ordinal in (0..ROWS as u32).step_by(2) {
                frame.get_mut(ordinal).remove(tag_id);
            }
            black_box(frame.compact());
        });
    });
}

criterion_group!(benches, bench_frame, bench_compaction);
criterion_main!(benches);
