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

//! Lanes that reconcile sounds which finished during mixing.

mod completion_lane;

pub use completion_lane::*;

use resona_core::{lane::Lane, AudioError};
use resona_data::AudioContext;

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionReport {
    /// Sounds that reached their end and were unregistered.
    pub stopped: usize,
    /// Of those, how many were destroyed as well.
    pub destroyed: usize,
}

impl CompletionReport {
    /// Returns `true` if nothing finished.
    pub fn is_empty(&self) -> bool {
        self.stopped == 0 && self.destroyed == 0
    }
}

/// A trait defining how finished sounds are retired.
///
/// Runs on the control thread once per application tick, never inside the
/// device callback.
pub trait AudioLifecycleLane: Lane {
    /// Stops, and possibly destroys, every registered sound that reached the
    /// end of its data without being set to repeat.
    fn reconcile(&self, context: &AudioContext) -> Result<CompletionReport, AudioError>;
}
