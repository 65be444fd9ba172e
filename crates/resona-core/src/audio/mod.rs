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

//! Audio contracts shared by every layer of the engine: the device boundary,
//! format tags, runtime configuration and the error hierarchy.

pub mod config;
pub mod device;
pub mod error;
pub mod format;

pub use config::AudioConfig;
pub use device::{AudioDevice, StreamInfo};
pub use error::AudioError;
pub use format::AudioFormat;

/// The engine always mixes to interleaved stereo, whatever the source layout.
pub const OUTPUT_CHANNELS: u16 = 2;

/// Normalization divisor for signed 16-bit samples.
pub const I16_NORMALIZER: f32 = i16::MAX as f32;
