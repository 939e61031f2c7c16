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

//! Small-integer maps used for the sparse forward (ordinal to slot) and
//! reverse (slot to ordinal) tables.

use ahash::AHashMap;
use serde::Deserialize;

/// A map from one `u32` key space to another.
pub trait OrdinalMap {
    /// Looks up a key.
    fn get(&self, key: u32) -> Option<u32>;

    /// Inserts a pair, returning the previous value.
    fn insert(&mut self, key: u32, value: u32) -> Option<u32>;

    /// Removes a key, returning its value.
    fn remove(&mut self, key: u32) -> Option<u32>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&mut self);
}

/// Array-backed map: one `Option<u32>` per key up to the highest key seen.
/// The right choice when keys are dense ordinals or slots.
#[derive(Debug, Clone, Default)]
pub struct ArrayMap {
    entries: Vec<Option<u32>>,
    len: usize,
}

impl OrdinalMap for ArrayMap {
    fn get(&self, key: u32) -> Option<u32> {
        self.entries.get(key as usize).copied().flatten()
    }

    fn insert(&mut self, key: u32, value: u32) -> Option<u32> {
        let index = key as usize;
        if index >= self.entries.len() {
            self.entries.resize(index + 1, None);
        }
        let previous = self.entries[index].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    fn remove(&mut self, key: u32) -> Option<u32> {
        let previous = self.entries.get_mut(key as usize)?.take();
        if previous.is_some() {
            self.len -= 1;
        }
        previous
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }
}

/// Hash-backed map for key spaces much larger than the number of entries.
#[derive(Debug, Clone, Default)]
pub struct HashedMap {
    entries: AHashMap<u32, u32>,
}

impl OrdinalMap for HashedMap {
    fn get(&self, key: u32) -> Option<u32> {
        self.entries.get(&key).copied()
    }

    fn insert(&mut self, key: u32, value: u32) -> Option<u32> {
        self.entries.insert(key, value)
    }

    fn remove(&mut self, key: u32) -> Option<u32> {
        self.entries.remove(&key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Which [`OrdinalMap`] a sparse aspect uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MapKind {
    /// [`ArrayMap`].
    #[default]
    Array,
    /// [`HashedMap`].
    Hashed,
}

/// An [`OrdinalMap`] whose backing is picked at construction.
#[derive(Debug, Clone)]
pub enum SlotMap {
    /// Array-backed.
    Array(ArrayMap),
    /// Hash-backed.
    Hashed(HashedMap),
}

impl SlotMap {
    /// Creates an empty map of the given kind.
    pub fn new(kind: MapKind) -> Self {
        match kind {
            MapKind::Array => Self::Array(ArrayMap::default()),
            MapKind::Hashed => Self::Hashed(HashedMap::default()),
        }
    }

    /// The kind of backing in use.
    pub fn kind(&self) -> MapKind {
        match self {
            Self::Array(_) => MapKind::Array,
            Self::Hashed(_) => MapKind::Hashed,
        }
    }
}

impl OrdinalMap for SlotMap {
    fn get(&self, key: u32) -> Option<u32> {
        match self {
            Self::Array(map) => map.get(key),
            Self::Hashed(map) => map.get(key),
        }
    }

    fn insert(&mut self, key: u32, value: u32) -> Option<u32> {
        match self {
            Self::Array(map) => map.insert(key, value),
            Self::Hashed(map) => map.insert(key, value),
        }
    }

    fn remove(&mut self, key: u32) -> Option<u32> {
        match self {
            Self::Array(map) => map.remove(key),
            Self::Hashed(map) => map.remove(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Array(map) => map.len(),
            Self::Hashed(map) => map.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Array(map) => map.clear(),
            Self::Hashed(map) => map.clear(),
        }
    }
}
