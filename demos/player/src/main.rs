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

//! Plays one or more sound files through the default output device.
//!
//! ```text
//! cargo run -p player -- assets/click.wav assets/music.qoa --volume 0.8
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use resona_agents::AudioAgent;
use resona_core::AudioConfig;
use resona_infra::CpalAudioDevice;
use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

/// Application frame used to drive the lifecycle tick.
const TICK: Duration = Duration::from_millis(16);

/// Plays sound files through the default output device.
#[derive(Parser, Debug)]
#[command(name = "player")]
#[command(about = "Plays sound files through the default output device")]
struct Args {
    /// Sound files to play simultaneously (wav, flac, qoa, ogg, mp3)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// RON audio configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Master volume override
    #[arg(short, long)]
    volume: Option<f32>,

    /// Playback speed applied to every sound
    #[arg(short, long, default_value_t = 1.0)]
    speed: f32,

    /// Loop the sounds for this many seconds instead of playing them once
    #[arg(long)]
    loop_for: Option<f64>,
}

fn main() -> Result<()> {
    resona_infra::logging::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AudioConfig::load(path)?,
        None => AudioConfig::default(),
    };

    let mut agent = AudioAgent::new(&config, Box::new(CpalAudioDevice::new(&config)));
    if let Some(volume) = args.volume {
        agent.set_master_volume(volume);
    }

    let mut sounds = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let buffer = agent
            .load_buffer(path)
            .with_context(|| format!("Cannot play '{}'", path.display()))?;
        log::info!(
            "{}: {}, {} ch, {} Hz, {:.2}s",
            path.display(),
            buffer.format(),
            buffer.channel_count(),
            buffer.sample_rate(),
            buffer.time_length()
        );

        let sound = agent.create_sound(&buffer);
        sound.set_speed(args.speed);
        sound.set_repeat(args.loop_for.is_some());
        sounds.push(sound);
    }

    agent.start()?;
    for sound in &sounds {
        agent.play(sound);
    }

    let deadline = args
        .loop_for
        .map(|seconds| Instant::now() + Duration::from_secs_f64(seconds.max(0.0)));
    loop {
        thread::sleep(TICK);
        agent.tick()?;

        let finished = match deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => agent.playing_count() == 0,
        };
        if finished {
            break;
        }
    }

    let stopped = agent.stop_all();
    log::info!("Playback finished ({} sounds still playing were stopped)", stopped);
    Ok(())
}
