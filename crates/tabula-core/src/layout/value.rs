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

//! Rust value types that can be read from and written to packed fields.

use super::scalar::ScalarKind;
use bytemuck::Pod;

/// A Rust value that maps onto a packed field.
///
/// Implementations exist for the scalar kinds (`bool`, `i8`..`u32`, `f32`),
/// for vectors as `[T; N]`, and for column-major float matrices as
/// `[[f32; ROWS]; COLUMNS]`. Buffers are byte-packed, so decoding never
/// assumes alignment.
pub trait FieldValue: Sized {
    /// The scalar kind of every element.
    const SCALAR: ScalarKind;
    /// The number of scalar elements.
    const ELEMENTS: usize;

    /// Writes the value into `out`, which is exactly `ELEMENTS * width` long.
    fn encode(&self, out: &mut [u8]);

    /// Reads a value back from `bytes`, which is exactly `ELEMENTS * width` long.
    fn decode(bytes: &[u8]) -> Self;
}

/// Marker for the plain-old-data scalar values. Vectors of these are
/// plain-old-data too and get their [`FieldValue`] impl for free.
pub trait PackedScalar: FieldValue + Pod {}

macro_rules! packed_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const SCALAR: ScalarKind = ScalarKind::$kind;
                const ELEMENTS: usize = 1;

                fn encode(&self, out: &mut [u8]) {
                    out.copy_from_slice(bytemuck::bytes_of(self));
                }

                fn decode(bytes: &[u8]) -> Self {
                    bytemuck::pod_read_unaligned(bytes)
                }
            }

            impl PackedScalar for $ty {}
        )*
    };
}

packed_scalar! {
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    f32 => Float32,
}

impl<T: PackedScalar, const N: usize> FieldValue for [T; N]
where
    [T; N]: Pod,
{
    const SCALAR: ScalarKind = T::SCALAR;
    const ELEMENTS: usize = N;

    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(bytemuck::bytes_of(self));
    }

    fn decode(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(bytes)
    }
}

impl<const ROWS: usize, const COLUMNS: usize> FieldValue for [[f32; ROWS]; COLUMNS]
where
    [[f32; ROWS]; COLUMNS]: Pod,
{
    const SCALAR: ScalarKind = ScalarKind::Float32;
    const ELEMENTS: usize = ROWS * COLUMNS;

    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(bytemuck::bytes_of(self));
    }

    fn decode(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(bytes)
    }
}

impl FieldValue for bool {
    const SCALAR: ScalarKind = ScalarKind::Bool;
    const ELEMENTS: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

macro_rules! bool_vector {
    ($($n:literal),*) => {
        $(
            impl FieldValue for [bool; $n] {
                const SCALAR: ScalarKind = ScalarKind::Bool;
                const ELEMENTS: usize = $n;

                fn encode(&self, out: &mut [u8]) {
                    for (byte, value) in out.iter_mut().zip(self) {
                        *byte = u8::from(*value);
                    }
                }

                fn decode(bytes: &[u8]) -> Self {
                    std::array::from_fn(|i| bytes[i] != 0)
                }
            }
        )*
    };
}

bool_vector!(2, 3, 4);

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: FieldValue + PartialEq + std::fmt::Debug>(value: T) {
        let mut bytes = vec![0u8; T::ELEMENTS * T::SCALAR.width()];
        value.encode(&mut bytes);
        assert_eq!(T::decode(&bytes), value);
    }

    #[test]
    fn decodes_from_unaligned_offsets() {
        let mut buffer = [0u8; 9];
        0x1234_5678u32.encode(&mut buffer[1..5]);
        (-2.5f32).encode(&mut buffer[5..9]);
        assert_eq!(u32::decode(&buffer[1..5]), 0x1234_5678);
        assert_eq!(f32::decode(&buffer[5..9]), -2.5);
    }

    #[test]
    fn compound_values() {
        round_trip([1.0f32, 2.0, 3.0]);
        round_trip([true, false, true, true]);
        round_trip([[1.0f32, 0.0], [0.0, 1.0]]);
        assert_eq!(<[[f32; 2]; 3]>::ELEMENTS, 6);
        assert_eq!(<[u8; 4]>::SCALAR, ScalarKind::Uint8);
    }

    #[test]
    fn bools_are_single_bytes() {
        let mut byte = [7u8];
        true.encode(&mut byte);
        assert_eq!(byte, [1]);
        false.encode(&mut byte);
        assert_eq!(byte, [0]);
    }
}
