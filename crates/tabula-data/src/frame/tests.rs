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

use super::*;
use tabula_core::layout::{FieldType, ScalarKind, StructType};

// --- HELPERS ---

/// A small deterministic generator so the property tests are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as u32
    }
}

fn assert_slots_consistent(slots: &SparseSlots) {
    let mut seen = std::collections::HashSet::new();
    for (ordinal, slot) in slots.iter() {
        assert!(seen.insert(ordinal), "ordinal {ordinal} maps to two slots");
        assert_eq!(slots.slot_of(ordinal), Some(slot));
        assert_eq!(slots.ordinal_of(slot), Some(ordinal));
    }
    assert_eq!(seen.len(), slots.len());
}

fn dat_frame(length: usize) -> (DataFrame<MonotonicIndex>, FieldHandle) {
    let frame = DataFrame::builder(MonotonicIndex::new(length))
        .dense("dat", ScalarKind::Uint8)
        .build();
    let dat = frame.aspect_field("dat").unwrap();
    (frame, dat)
}

fn read_ids(frame: &DataFrame<MonotonicIndex>, field: FieldHandle) -> Vec<u8> {
    (1..=frame.len() as u32)
        .map(|id| frame.cursor_at(id).unwrap().read::<u8>(field).unwrap())
        .collect()
}

// --- TESTS ---

#[test]
fn test_dense_order_stays_bijective() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(16))
        .dense_order("draw")
        .build();
    let draw = frame.aspect_id("draw").unwrap();
    let mut rng = Lcg(7);

    // --- 2. ACTION ---
    for _ in 0..200 {
        let ordinal = rng.next(16);
        let position = rng.next(16);
        frame.get_mut(ordinal).set_order(draw, position);
    }

    // --- 3. ASSERTIONS ---
    let Aspect::DenseOrder(order) = frame.aspect(draw) else {
        panic!("`draw` should be a dense order");
    };
    let mut positions = order.positions().to_vec();
    for ordinal in 0..16 {
        assert_eq!(order.ordinal_at(order.order_of(ordinal)), ordinal);
    }
    positions.sort_unstable();
    assert_eq!(positions, (0..16).collect::<Vec<_>>());
}

#[test]
fn test_sparse_maps_stay_mutual_inverses() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(64))
        .sparse("tag", ScalarKind::Uint16)
        .build();
    let tag_id = frame.aspect_id("tag").unwrap();
    let tag = frame.aspect_field("tag").unwrap();
    let mut rng = Lcg(42);

    // --- 2. ACTION ---
    for step in 0..500u32 {
        let ordinal = rng.next(64);
        let mut row = frame.get_mut(ordinal);
        if rng.next(3) == 0 {
            row.remove(tag_id);
        } else {
            row.write(tag, step as u16);
        }
        if step % 50 == 0 {
            frame.compact();
        }
    }

    // --- 3. ASSERTIONS ---
    let slots = frame.aspect(tag_id).slots().unwrap();
    assert_slots_consistent(slots);
    for row in frame.sparse_rows(tag_id) {
        assert!(row.has(tag_id));
        assert!(row.read::<u16>(tag).is_some());
    }
}

#[test]
fn test_monotonic_resize_preserves_overlap() {
    // --- 1. SETUP ---
    let (mut frame, dat) = dat_frame(4);
    for id in 1..=4u32 {
        frame.cursor_at_mut(id).unwrap().write(dat, id as u8 * 10);
    }

    // --- 2. ACTION & 3. ASSERTIONS ---
    frame.resize(6);
    assert_eq!(read_ids(&frame, dat), vec![10, 20, 30, 40, 0, 0]);

    frame.resize(4);
    assert_eq!(read_ids(&frame, dat), vec![10, 20, 30, 40]);
    assert!(frame.cursor_at(5).is_none());
}

#[test]
fn test_grid_resize_preserves_rectangle() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(GridIndex::new(2, 2))
        .dense("dat", ScalarKind::Uint8)
        .build();
    let dat = frame.aspect_field("dat").unwrap();
    for ((x, y), value) in [((0, 0), 7u8), ((1, 0), 14), ((0, 1), 21), ((1, 1), 28)] {
        frame.cursor_at_mut((x, y)).unwrap().write(dat, value);
    }

    // --- 2. ACTION ---
    frame.resize((3, 2));

    // --- 3. ASSERTIONS ---
    let read = |x, y| frame.cursor_at((x, y)).unwrap().read::<u8>(dat).unwrap();
    assert_eq!(read(0, 0), 7);
    assert_eq!(read(1, 0), 14);
    assert_eq!(read(2, 0), 0);
    assert_eq!(read(0, 1), 21);
    assert_eq!(read(1, 1), 28);
    assert_eq!(read(2, 1), 0);
    assert_eq!(frame.index().width(), 3);
}

#[test]
fn test_compaction_preserves_logical_content() {
    // --- 1. SETUP ---
    // Slots 0, 2 and 3 hold ordinals 1, 4 and 3; slot 1 is a hole.
    let mut frame = DataFrame::builder(MonotonicIndex::new(5))
        .sparse("dat", ScalarKind::Uint8)
        .build();
    let aspect = frame.aspect_id("dat").unwrap();
    let dat = frame.aspect_field("dat").unwrap();
    for (ordinal, value) in [(1, 7u8), (2, 99), (4, 21), (3, 14)] {
        frame.get_mut(ordinal).write(dat, value);
    }
    assert!(frame.get_mut(2).remove(aspect));
    let slots = frame.aspect(aspect).slots().unwrap();
    assert_eq!(slots.iter().collect::<Vec<_>>(), vec![(1, 0), (4, 2), (3, 3)]);

    // --- 2. ACTION ---
    let moved = frame.compact();

    // --- 3. ASSERTIONS ---
    assert_eq!(moved, 2);
    let slots = frame.aspect(aspect).slots().unwrap();
    let used: Vec<Slot> = slots.iter().map(|(_, slot)| slot).collect();
    assert_eq!(used, vec![0, 1, 2]);
    assert_slots_consistent(slots);
    assert_eq!(frame.get(1).read::<u8>(dat), Some(7));
    assert_eq!(frame.get(3).read::<u8>(dat), Some(14));
    assert_eq!(frame.get(4).read::<u8>(dat), Some(21));
    assert_eq!(frame.get(2).read::<u8>(dat), None);
}

#[test]
fn test_allocator_reuses_before_growth() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(10))
        .sparse("dat", ScalarKind::Uint8)
        .build();
    let aspect = frame.aspect_id("dat").unwrap();
    let dat = frame.aspect_field("dat").unwrap();
    for ordinal in 0..4 {
        frame.get_mut(ordinal).write(dat, 1u8);
    }

    // --- 2. ACTION ---
    frame.get_mut(1).remove(aspect);
    frame.get_mut(9).write(dat, 2u8);

    // --- 3. ASSERTIONS ---
    let slots = frame.aspect(aspect).slots().unwrap();
    assert_eq!(slots.slot_of(9), Some(1), "the freed slot is handed out first");
    assert_eq!(slots.len(), 4);
}

#[test]
fn test_scenario_resize_readback() {
    // --- 1. SETUP ---
    let (mut frame, dat) = dat_frame(4);

    // --- 2. ACTION ---
    frame.get_mut(2).write(dat, 14u8);
    frame.resize(6);

    // --- 3. ASSERTIONS ---
    assert_eq!(read_ids(&frame, dat), vec![0, 0, 14, 0, 0, 0]);
}

#[test]
fn test_dense_order_resets_to_identity_on_resize() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(3))
        .dense_order("draw")
        .build();
    let draw = frame.aspect_id("draw").unwrap();
    frame.get_mut(2).set_order(draw, 0);
    assert_eq!(frame.get(2).order(draw), Some(0));

    // --- 2. ACTION ---
    frame.resize(5);

    // --- 3. ASSERTIONS ---
    // Order is not carried across a resize.
    let orders: Vec<_> = frame.rows().map(|row| row.order(draw).unwrap()).collect();
    assert_eq!(orders, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_sparse_resize_drops_elements_outside_the_new_shape() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(GridIndex::new(3, 3))
        .sparse("unit", ScalarKind::Uint32)
        .sparse_order("draw")
        .build();
    let unit_id = frame.aspect_id("unit").unwrap();
    let draw = frame.aspect_id("draw").unwrap();
    let unit = frame.aspect_field("unit").unwrap();
    for (x, y) in [(0, 0), (2, 0), (1, 1), (2, 2)] {
        let mut row = frame.cursor_at_mut((x, y)).unwrap();
        row.write(unit, (x * 10 + y) as u32);
        row.set_order(draw, 0);
    }

    // --- 2. ACTION ---
    frame.resize((2, 2));

    // --- 3. ASSERTIONS ---
    assert_eq!(frame.aspect(unit_id).len(), 2);
    assert_eq!(frame.aspect(draw).len(), 2);
    assert_eq!(frame.cursor_at((0, 0)).unwrap().read::<u32>(unit), Some(0));
    assert_eq!(frame.cursor_at((1, 1)).unwrap().read::<u32>(unit), Some(11));
    assert_slots_consistent(frame.aspect(unit_id).slots().unwrap());
    assert_slots_consistent(frame.aspect(draw).slots().unwrap());

    let mut orders: Vec<_> = frame
        .sparse_rows(draw)
        .map(|row| row.order(draw).unwrap())
        .collect();
    orders.sort_unstable();
    assert_eq!(orders, vec![0, 1]);
}

#[test]
fn test_cursor_reads_struct_fields_and_components() {
    // --- 1. SETUP ---
    let pose = StructType::new("Pose")
        .tagged("position", "vec3")
        .tagged("kind", "uint8")
        .tagged("transform", "mat2")
        .tagged("tint", "rgba");
    let mut frame = DataFrame::builder(MonotonicIndex::new(3))
        .dense("pose", FieldType::from(pose))
        .build();
    let position = frame.field("pose", "position").unwrap();
    let kind = frame.field("pose", "kind").unwrap();
    let transform = frame.field("pose", "transform").unwrap();
    let tint = frame.field("pose", "tint").unwrap();

    // --- 2. ACTION ---
    let mut row = frame.get_mut(1);
    row.write(position, [1.0f32, 2.0, 3.0]);
    row.write(kind, 9u8);
    row.write(transform, [[1.0f32, 0.0], [0.0, 1.0]]);
    row.set_component(tint, 3, 255u8);
    row.set_component(position, 1, 5.0f32);

    // --- 3. ASSERTIONS ---
    assert_eq!(row.read::<[f32; 3]>(position), Some([1.0, 5.0, 3.0]));
    assert_eq!(row.component::<f32>(transform, 3), Some(1.0));
    assert_eq!(row.read::<[u8; 4]>(tint), Some([0, 0, 0, 255]));

    row.rebind(2);
    assert_eq!(row.component::<f32>(position, 1), Some(0.0));
    assert_eq!(row.read::<u8>(kind), Some(0));

    let row = frame.get(1);
    assert_eq!(row.read::<u8>(kind), Some(9));
    assert_eq!(frame.aspect(position.aspect()).layout().byte_stride, 33);
}

#[test]
#[should_panic(expected = "accessed as 1 x uint32")]
fn test_typed_access_rejects_the_wrong_type() {
    let (frame, dat) = dat_frame(2);
    frame.get(0).read::<u32>(dat);
}

#[test]
fn test_sparse_removal_invalidates_cached_views() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(4))
        .sparse("velocity", FieldType::parse("vec2"))
        .build();
    let aspect = frame.aspect_id("velocity").unwrap();
    let velocity = frame.aspect_field("velocity").unwrap();

    // --- 2. ACTION ---
    let mut row = frame.get_mut(0);
    row.set_component(velocity, 0, 2.5f32);
    assert_eq!(row.component::<f32>(velocity, 0), Some(2.5));
    row.remove(aspect);

    // --- 3. ASSERTIONS ---
    assert_eq!(row.component::<f32>(velocity, 0), None);
    assert!(!row.has(aspect));
    row.set_component(velocity, 1, 4.0f32);
    assert_eq!(row.read::<[f32; 2]>(velocity), Some([0.0, 4.0]));
}

#[test]
fn test_walk_mut_visits_every_row() {
    // --- 1. SETUP ---
    let (mut frame, dat) = dat_frame(5);

    // --- 2. ACTION ---
    let mut walk = frame.walk_mut();
    while let Some(row) = walk.next_row() {
        let id = row.reference();
        row.write(dat, id as u8);
    }

    // --- 3. ASSERTIONS ---
    assert_eq!(read_ids(&frame, dat), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_clear_resets_every_aspect() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(3))
        .dense("dat", ScalarKind::Int16)
        .sparse("tag", ScalarKind::Bool)
        .dense_order("draw")
        .build();
    let dat = frame.aspect_field("dat").unwrap();
    let tag = frame.aspect_field("tag").unwrap();
    let draw = frame.aspect_id("draw").unwrap();
    {
        let mut row = frame.get_mut(0);
        row.write(dat, -4i16);
        row.write(tag, true);
        row.set_order(draw, 2);
    }

    // --- 2. ACTION ---
    frame.clear();

    // --- 3. ASSERTIONS ---
    let row = frame.get(0);
    assert_eq!(row.read::<i16>(dat), Some(0));
    assert_eq!(row.read::<bool>(tag), None);
    assert_eq!(row.order(draw), Some(0));
    assert_eq!(frame.len(), 3);
}

#[test]
fn test_compact_fragmented_skips_tidy_aspects() {
    // --- 1. SETUP ---
    let mut frame = DataFrame::builder(MonotonicIndex::new(8))
        .sparse("holey", ScalarKind::Uint8)
        .sparse("tidy", ScalarKind::Uint8)
        .build();
    let holey_id = frame.aspect_id("holey").unwrap();
    let holey = frame.aspect_field("holey").unwrap();
    let tidy = frame.aspect_field("tidy").unwrap();
    for ordinal in 0..4 {
        let mut row = frame.get_mut(ordinal);
        row.write(holey, 1u8);
        row.write(tidy, 1u8);
    }
    frame.get_mut(0).remove(holey_id);
    frame.get_mut(1).remove(holey_id);

    // --- 2. ACTION ---
    let moved = frame.compact_fragmented(0.25);

    // --- 3. ASSERTIONS ---
    assert_eq!(moved, 2);
    let stats = frame.stats();
    assert_eq!(stats.aspects[0].allocator.unwrap().holes, 0);
    assert_eq!(stats.aspects[1].allocator.unwrap().holes, 0);
    assert_eq!(frame.compact_fragmented(0.25), 0);
}
