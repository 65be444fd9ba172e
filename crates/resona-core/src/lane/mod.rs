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

//! # Lane Abstraction
//!
//! A **Lane** is a reusable, swappable processing strategy owned by an agent.
//! Each lane encapsulates one algorithmic approach to a domain task: mixing
//! active sounds, reconciling finished sounds, or decoding one asset format.
//!
//! Domain traits extend `Lane` with typed methods: `AudioMixingLane: Lane`,
//! `AudioLifecycleLane: Lane` and `AssetLoaderLane<A>: Lane`. Agents call
//! those methods directly, so the mixer never goes through a type-erased
//! context on the real-time thread.

use std::any::Any;
use std::fmt;

/// Error type for lane operations.
#[derive(Debug)]
pub enum LaneError {
    /// The lane was handed inputs it cannot work with.
    InvalidContext {
        /// What the lane expected.
        expected: &'static str,
        /// Description of what was received.
        received: String,
    },
}

impl fmt::Display for LaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneError::InvalidContext { expected, received } => {
                write!(
                    f,
                    "Invalid lane context: expected {expected}, got {received}"
                )
            }
        }
    }
}

impl std::error::Error for LaneError {}

/// Classification of lane types, used for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Audio mixing and sound lifecycle.
    Audio,
    /// Asset loading and decoding.
    Asset,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Audio => write!(f, "Audio"),
            LaneKind::Asset => write!(f, "Asset"),
        }
    }
}

/// Base trait for ALL lane types in the engine.
///
/// Carries identity and classification only; the work itself is done through
/// the domain trait a lane implements.
pub trait Lane: Send + Sync {
    /// Human-readable name identifying this lane's strategy.
    ///
    /// Used for logging and debugging. Should be unique within a lane kind
    /// (e.g., `"NearestMixing"`, `"WavLoader"`).
    fn strategy_name(&self) -> &'static str;

    /// The kind of processing this lane performs.
    fn lane_kind(&self) -> LaneKind;

    // --- Downcasting ---

    /// Returns a reference to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the concrete type for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
