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

//! A plain bitset over slot numbers.

use super::Slot;

/// A simple bitset wrapped around a `Vec<u64>`.
///
/// The sparse allocator keeps one bit per physical slot and relies on
/// [`SlotBitset::first_clear`] to find the lowest hole in a single pass over
/// whole words.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SlotBitset {
    bits: Vec<u64>,
}

impl SlotBitset {
    /// Creates a new, empty bitset.
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Sets the bit at the specified index to 1.
    pub fn set(&mut self, index: Slot) {
        let word_idx = (index / 64) as usize;
        let bit_idx = index % 64;

        if word_idx >= self.bits.len() {
            self.bits.resize(word_idx + 1, 0);
        }

        self.bits[word_idx] |= 1 << bit_idx;
    }

    /// Clears the bit at the specified index to 0.
    pub fn clear(&mut self, index: Slot) {
        let word_idx = (index / 64) as usize;
        let bit_idx = index % 64;

        if let Some(word) = self.bits.get_mut(word_idx) {
            *word &= !(1 << bit_idx);
        }
    }

    /// Returns true if the bit at the specified index is set.
    pub fn is_set(&self, index: Slot) -> bool {
        let word_idx = (index / 64) as usize;
        let bit_idx = index % 64;

        self.bits
            .get(word_idx)
            .is_some_and(|word| word & (1 << bit_idx) != 0)
    }

    /// Returns the lowest clear index strictly below `limit`.
    pub fn first_clear(&self, limit: Slot) -> Option<Slot> {
        self.first_clear_from(0, limit)
    }

    /// Returns the lowest clear index in `start..limit`.
    pub fn first_clear_from(&self, start: Slot, limit: Slot) -> Option<Slot> {
        if start >= limit {
            return None;
        }
        let words = (limit as usize).div_ceil(64);
        let first_word = (start / 64) as usize;
        for word_idx in first_word..words {
            let mut word = self.bits.get(word_idx).copied().unwrap_or(0);
            if word_idx == first_word {
                // Pretend the bits below `start` are taken.
                word |= (1u64 << (start % 64)) - 1;
            }
            if word != u64::MAX {
                let index = (word_idx * 64) as Slot + (!word).trailing_zeros();
                return (index < limit).then_some(index);
            }
        }
        None
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Resets every bit to 0, keeping the allocation.
    pub fn clear_all(&mut self) {
        self.bits.fill(0);
    }

    /// Iterates over the set indices in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = Slot> + '_ {
        self.bits
            .iter()
            .enumerate()
            .flat_map(|(word_idx, &word)| {
                let base = (word_idx * 64) as Slot;
                let mut rest = word;
                std::iter::from_fn(move || {
                    (rest != 0).then(|| {
                        let bit = rest.trailing_zeros();
                        rest &= rest - 1;
                        base + bit
                    })
                })
            })
    }
}
