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

//! Provides the foundational traits and primitive types for Resona's asset system.
//!
//! Decoded audio is shared between every sound instance that plays it. This
//! module defines the marker trait for such shared data and the reference-counted
//! handle used to share it, so that audio data can never be released while a
//! sound still points at it.

mod handle;

pub use handle::*;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits enforce the guarantees needed to hand an asset to the
/// real-time audio thread:
/// - `Send` + `Sync`: the asset can be shared between the control thread and
///   the mixing thread.
/// - `'static`: the asset holds no borrowed data.
///
/// # Examples
///
/// ```
/// use resona_core::asset::Asset;
///
/// struct Impulse {
///     samples: Vec<i16>,
/// }
///
/// impl Asset for Impulse {}
/// ```
pub trait Asset: Send + Sync + 'static {}
