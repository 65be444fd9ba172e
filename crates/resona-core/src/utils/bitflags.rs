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

//! Declares typed flag sets over an unsigned integer.
//!
//! Only what state bits need: construction from raw bits, membership tests
//! and union. Mutation happens on the atomic that stores the bits.

/// Defines a `Copy` flag set with one associated constant per flag.
#[macro_export]
#[doc(hidden)]
macro_rules! resona_bitflags {
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
            /// No flag set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Wraps raw bits, undeclared ones included.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits.
            pub const fn bits(self) -> $ty {
                self.bits
            }

            /// Returns `true` if every flag of `other` is set.
            pub const fn contains(self, other: Self) -> bool {
                self.bits & other.bits == other.bits
            }

            /// Returns `true` if any flag of `other` is set.
            pub const fn intersects(self, other: Self) -> bool {
                self.bits & other.bits != 0
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        // Writes flag names directly; formatting never allocates.
        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{} {{ ", stringify!($name))?;
                let mut rest = self.bits;
                let mut separator = "";
                $(
                    if $flag_value != 0 && rest & $flag_value == $flag_value {
                        write!(f, "{}{}", separator, stringify!($flag_name))?;
                        rest &= !$flag_value;
                        separator = " | ";
                    }
                )*
                if rest != 0 {
                    write!(f, "{}{:#x}", separator, rest)?;
                } else if self.bits == 0 {
                    write!(f, "EMPTY")?;
                }
                write!(f, " }}")
            }
        }
    };
}
