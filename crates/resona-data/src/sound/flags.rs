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

use resona_core::resona_bitflags;
use std::sync::atomic::{AtomicU8, Ordering};

resona_bitflags! {
    /// Independent state bits of a sound instance.
    pub struct SoundFlags: u8 {
        /// The instance is in the active-sound registry.
        const IS_PLAYING = 1 << 0;
        /// Playback wraps to the start instead of finishing.
        const SHOULD_REPEAT = 1 << 1;
        /// Natural completion stops the instance but keeps it alive.
        const DONT_DESTROY_AFTER_FINISH = 1 << 2;
        /// Terminal: the instance was destroyed and ignores further control.
        const DESTROYED = 1 << 3;
    }
}

/// [`SoundFlags`] stored in an atomic byte.
///
/// `IS_PLAYING` is only ever changed while the registry lock is held; the
/// other bits may be flipped by the control thread at any time.
#[derive(Debug, Default)]
pub struct AtomicSoundFlags(AtomicU8);

impl AtomicSoundFlags {
    /// Creates the cell with an initial value.
    pub fn new(flags: SoundFlags) -> Self {
        Self(AtomicU8::new(flags.bits()))
    }

    /// Current flags.
    #[inline]
    pub fn load(&self) -> SoundFlags {
        SoundFlags::from_bits_retain(self.0.load(Ordering::Acquire))
    }

    /// Returns `true` if every flag in `flags` is set.
    #[inline]
    pub fn contains(&self, flags: SoundFlags) -> bool {
        self.load().contains(flags)
    }

    /// Sets `flags`.
    pub fn insert(&self, flags: SoundFlags) {
        self.0.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    /// Clears `flags`.
    pub fn remove(&self, flags: SoundFlags) {
        self.0.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    /// Sets or clears `flags`.
    pub fn set(&self, flags: SoundFlags, value: bool) {
        if value {
            self.insert(flags);
        } else {
            self.remove(flags);
        }
    }
}
