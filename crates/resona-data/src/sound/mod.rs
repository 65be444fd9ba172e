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

//! Sound instances and the state shared between the control and mixing threads.
//!
//! - [`SoundInstance`]: per-playback state (volume, speed, time cursor, flags)
//!   bound to one decoded buffer, addressed through a [`SoundHandle`].
//! - [`ActiveSoundRegistry`]: the lock-guarded set of playing sounds. It is
//!   the only mutable structure crossing the thread boundary.
//! - [`AudioContext`]: owns the registry, the master volume and the output
//!   rate; agents inject it into both the control API and the mixer.

mod context;
mod flags;
mod instance;
mod registry;

pub use context::*;
pub use flags::*;
pub use instance::*;
pub use registry::*;
