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

//! A macro to define bitflags in a structured way.

#[macro_export]
#[doc(hidden)]
macro_rules! tabula_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if all flags in `other` are set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is set in `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut names = Vec::new();
                $(
                    if $flag_value != 0 && (self.bits & $flag_value) == $flag_value {
                        names.push(stringify!($flag_name));
                    }
                )*
                if names.is_empty() {
                    write!(f, "{} {{ EMPTY }}", stringify!($name))
                } else {
                    write!(f, "{} {{ {} }}", stringify!($name), names.join(" | "))
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::tabula_bitflags;

    tabula_bitflags! {
        /// Flags for macro verification.
        pub struct TestFlags: u32 {
            const READ = 1 << 0;
            const WRITE = 1 << 1;
            const SHARE = 1 << 2;
        }
    }

    #[test]
    fn union_and_contains() {
        let flags = TestFlags::READ | TestFlags::SHARE;
        assert_eq!(flags.bits(), 0b101);
        assert!(flags.contains(TestFlags::READ));
        assert!(!flags.contains(TestFlags::READ | TestFlags::WRITE));
        assert!(flags.intersects(TestFlags::READ | TestFlags::WRITE));
    }

    #[test]
    fn debug_lists_set_flags() {
        assert_eq!(format!("{:?}", TestFlags::EMPTY), "TestFlags { EMPTY }");
        assert_eq!(
            format!("{:?}", TestFlags::READ | TestFlags::WRITE),
            "TestFlags { READ | WRITE }"
        );
    }
}
