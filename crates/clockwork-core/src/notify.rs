//! Notification sink contract.
//!
//! Every fire event must be audible. The [`Notifier`] tries the configured
//! sound file first and falls back to [`Tone::FALLBACK`] when that fails or
//! no file is configured. Playback errors never leave this module.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::PlaybackError;
use crate::events::Event;
use crate::storage::NotificationsConfig;

/// A synthesized sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    /// Linear amplitude, 0.0 ..= 1.0.
    pub gain: f32,
    pub duration: Duration,
}

impl Tone {
    /// 1 kHz sine, gain 0.1, one second.
    pub const FALLBACK: Tone = Tone {
        frequency_hz: 1000.0,
        gain: 0.1,
        duration: Duration::from_secs(1),
    };
}

/// Audio output used by the notifier.
pub trait Player {
    fn play_file(&self, path: &Path) -> Result<(), PlaybackError>;
    fn play_tone(&self, tone: &Tone) -> Result<(), PlaybackError>;
}

/// Which path produced the sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Playback {
    Primary,
    Fallback,
    /// Both paths failed; logged, not surfaced.
    Failed,
    /// Notifications are disabled in the configuration.
    Muted,
}

pub struct Notifier {
    player: Box<dyn Player>,
    sound_file: Option<PathBuf>,
    enabled: bool,
}

impl Notifier {
    pub fn new(player: Box<dyn Player>, sound_file: Option<PathBuf>) -> Self {
        Self {
            player,
            sound_file,
            enabled: true,
        }
    }

    pub fn from_config(player: Box<dyn Player>, config: &NotificationsConfig) -> Self {
        let mut notifier = Self::new(player, config.sound_file.clone());
        notifier.enabled = config.enabled;
        notifier
    }

    /// Sound the alert for a fire event. Other events are ignored.
    pub fn notify(&self, event: &Event) -> Option<Playback> {
        if !event.is_fire() {
            return None;
        }
        if !self.enabled {
            return Some(Playback::Muted);
        }
        Some(self.alert())
    }

    /// Play the primary sound, or the fallback tone if that fails.
    pub fn alert(&self) -> Playback {
        if let Some(path) = &self.sound_file {
            match self.player.play_file(path) {
                Ok(()) => return Playback::Primary,
                Err(e) => warn!(error = %e, "primary sound unavailable, using fallback tone"),
            }
        } else {
            debug!("no sound file configured, using fallback tone");
        }
        match self.player.play_tone(&Tone::FALLBACK) {
            Ok(()) => Playback::Fallback,
            Err(e) => {
                error!(error = %e, "fallback tone failed");
                Playback::Failed
            }
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sound_file", &self.sound_file)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
