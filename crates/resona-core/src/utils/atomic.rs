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

//! Atomic floating-point cells.
//!
//! Playback parameters are written by the control thread while the mixing
//! thread reads them, so they are stored as bit-cast atomic integers.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// An `f32` with atomic load/store, backed by an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    /// Creates a new `AtomicF32` with the given initial value.
    pub fn new(val: f32) -> Self {
        Self {
            bits: AtomicU32::new(val.to_bits()),
        }
    }

    /// Atomically loads the value.
    #[inline]
    pub fn load(&self, ordering: Ordering) -> f32 {
        f32::from_bits(self.bits.load(ordering))
    }

    /// Atomically stores the value.
    #[inline]
    pub fn store(&self, val: f32, ordering: Ordering) {
        self.bits.store(val.to_bits(), ordering);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// An `f64` with atomic load/store, backed by an `AtomicU64`.
#[derive(Debug)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    /// Creates a new `AtomicF64` with the given initial value.
    pub fn new(val: f64) -> Self {
        Self {
            bits: AtomicU64::new(val.to_bits()),
        }
    }

    /// Atomically loads the value.
    #[inline]
    pub fn load(&self, ordering: Ordering) -> f64 {
        f64::from_bits(self.bits.load(ordering))
    }

    /// Atomically stores the value.
    #[inline]
    pub fn store(&self, val: f64, ordering: Ordering) {
        self.bits.store(val.to_bits(), ordering);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}
