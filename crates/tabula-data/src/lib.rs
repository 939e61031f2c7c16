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

//! # Tabula Data
//!
//! A columnar entity-attribute store. A [`DataFrame`](frame::DataFrame) pairs
//! one [`Index`](frame::Index) strategy with named aspects: dense columns that
//! hold one packed value per ordinal, and sparse columns that hold at most one
//! value per ordinal in a compactable slot pool. Aspect buffers are laid out
//! byte-for-byte the way the GPU consumes them, and the [`gpu`] module binds
//! and uploads them without reformatting.

#![warn(missing_docs)]

pub mod frame;
pub mod gpu;

pub use frame::*;
