//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;
use novelvox_core::{PlaybackSpeed, PlayerSettings, SettingsUpdate, Voice};

use crate::commands::Commands;

/// Command-line interface for the novelvox audiobook reader.
#[derive(Parser)]
#[command(name = "novelvox")]
#[command(about = "Listen to web novels narrated by a speech backend")]
#[command(version)]
pub struct Cli {
    /// Base URL of the novel/TTS backend
    #[arg(long = "api-url", env = "NOVELVOX_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Narrator voice (backend id or short name, e.g. "aria")
    #[arg(long, env = "NOVELVOX_VOICE", global = true)]
    pub voice: Option<Voice>,

    /// Playback speed (0.5, 0.75, 1, 1.25, 1.5, 1.75 or 2)
    #[arg(long, env = "NOVELVOX_SPEED", global = true)]
    pub speed: Option<PlaybackSpeed>,

    /// Number of upcoming paragraphs to synthesize ahead
    #[arg(long, env = "NOVELVOX_PREFETCH", global = true)]
    pub prefetch: Option<usize>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Reader settings: defaults overridden by whatever was given on the
    /// command line or in the environment.
    pub fn settings(&self) -> PlayerSettings {
        let mut settings = PlayerSettings::with_defaults();
        settings.merge(&SettingsUpdate {
            api_base_url: self.api_url.clone().map(Some),
            voice: self.voice.map(Some),
            speed: self.speed.map(Some),
            prefetch_window: self.prefetch.map(Some),
        });
        settings
    }
}
