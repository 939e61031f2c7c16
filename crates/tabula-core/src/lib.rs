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

//! # Tabula Core
//!
//! Foundational crate for the Tabula columnar frame: field types and their
//! byte-packed layouts, typed field values, and the GPU buffer contracts the
//! rendering layer implements.

#![warn(missing_docs)]

pub mod layout;
pub mod renderer;
pub mod utils;

pub use layout::{
    layout_of, FieldLayout, FieldShape, FieldType, FieldValue, Layout, MatrixType,
    PrimitiveType, ScalarKind, StructType, VectorType,
};
