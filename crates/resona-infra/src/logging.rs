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

//! Logger set-up for binaries embedding the engine.

use env_logger::{Builder, Env};

/// Installs `env_logger` as the global logger.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling it again
/// once a logger is installed does nothing.
pub fn init() {
    let installed = Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("cpal", log::LevelFilter::Warn)
        .try_init();
    if installed.is_err() {
        log::debug!("A global logger is already installed");
    }
}
