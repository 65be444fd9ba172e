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

//! Runtime configuration of the audio subsystem.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default output rate, matching most desktop devices.
pub const DEFAULT_OUTPUT_SAMPLE_RATE: u32 = 48_000;

/// Settings fixed when the audio subsystem starts.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it overrides:
///
/// ```
/// use resona_core::AudioConfig;
///
/// let config = AudioConfig::from_ron_str("(output_sample_rate: 44100)").unwrap();
/// assert_eq!(config.output_sample_rate, 44100);
/// assert_eq!(config.master_volume, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// The rate every loaded buffer is resampled to, in Hz.
    pub output_sample_rate: u32,
    /// Fixed device buffer size in frames; `None` keeps the device default.
    pub buffer_frames: Option<u32>,
    /// Initial master volume applied to every sound.
    pub master_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_sample_rate: DEFAULT_OUTPUT_SAMPLE_RATE,
            buffer_frames: None,
            master_volume: 1.0,
        }
    }
}

impl AudioConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Reads, parses and validates a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read audio config '{}'", path.display()))?;
        let config = Self::from_ron_str(&text)
            .with_context(|| format!("Failed to parse audio config '{}'", path.display()))?;
        config.validate()?;
        log::debug!("Loaded audio config from '{}': {:?}", path.display(), config);
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.output_sample_rate == 0 {
            bail!("output_sample_rate must be greater than zero");
        }
        if matches!(self.buffer_frames, Some(0)) {
            bail!("buffer_frames must be greater than zero when set");
        }
        if !self.master_volume.is_finite() || self.master_volume < 0.0 {
            bail!(
                "master_volume must be a finite, non-negative value (got {})",
                self.master_volume
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_struct_uses_defaults() {
        let config = AudioConfig::from_ron_str("()").unwrap();
        assert_eq!(config, AudioConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config_parses() {
        let config = AudioConfig::from_ron_str(
            "(output_sample_rate: 22050, buffer_frames: Some(512), master_volume: 0.5)",
        )
        .unwrap();
        assert_eq!(config.output_sample_rate, 22050);
        assert_eq!(config.buffer_frames, Some(512));
        approx::assert_relative_eq!(config.master_volume, 0.5);
    }

    #[test]
    fn test_validation_rejects_zero_rate_and_negative_volume() {
        let zero_rate = AudioConfig {
            output_sample_rate: 0,
            ..AudioConfig::default()
        };
        assert!(zero_rate.validate().is_err());

        let negative = AudioConfig {
            master_volume: -1.0,
            ..AudioConfig::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.ron");
        std::fs::write(&path, "(master_volume: 0.25)").unwrap();
        let config = AudioConfig::load(&path).unwrap();
        approx::assert_relative_eq!(config.master_volume, 0.25);

        assert!(AudioConfig::load(dir.path().join("missing.ron")).is_err());
    }
}
