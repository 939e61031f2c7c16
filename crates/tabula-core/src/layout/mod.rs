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

//! Field types and the byte layout calculator.
//!
//! Every aspect of a frame stores one [`FieldType`]. The calculator in this
//! module turns that type into a [`Layout`]: a byte stride and an ordered list
//! of byte-packed fields. The same layout drives the CPU accessors and the
//! GPU vertex attribute binding, so it never introduces padding.

mod calculator;
mod scalar;
mod types;
mod value;

pub use calculator::*;
pub use scalar::ScalarKind;
pub use types::*;
pub use value::{FieldValue, PackedScalar};
