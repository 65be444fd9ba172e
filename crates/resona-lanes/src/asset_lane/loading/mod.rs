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

//! Loader lanes and the trait they share.

mod audio_loader_lane;

pub use audio_loader_lane::*;

use resona_core::{asset::Asset, lane::Lane};
use std::error::Error;

/// A lane that parses a byte slice into one kind of asset.
///
/// Implementors do the CPU-bound work of decoding raw file data into an
/// engine-ready value. Each loader is specialized for a single asset type
/// `A`; file access and format dispatch happen in the owning agent.
pub trait AssetLoaderLane<A: Asset>: Lane {
    /// Parses `bytes` into an instance of `A`.
    ///
    /// The error is boxed and thread-safe so that loaders backed by different
    /// libraries can report their own error types.
    fn load(&self, bytes: &[u8]) -> Result<A, Box<dyn Error + Send + Sync>>;
}
