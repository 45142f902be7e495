//! Audio
//!
//! [`Sounds`] is the command surface the world drives: one-shot playback by
//! name and a master volume that the reveal fades in. Actual mixing and
//! playback belong to the audio backend.

use crate::tween::Param;
use std::collections::HashMap;

/// Names of the one-shot sounds the world can trigger
pub const SOUND_NAMES: &[&str] = &[
    "reveal",
    "brick",
    "bowlingPin",
    "bowlingBall",
    "carHit",
    "woodHit",
    "screech",
    "uiArea",
    "horn",
];

/// Sound registry with a master volume and a playback log
#[derive(Debug)]
pub struct Sounds {
    master_volume: Param,
    muted: bool,
    played: Vec<String>,
    play_counts: HashMap<String, u32>,
}

impl Sounds {
    /// Create the registry; the master volume starts silent until revealed
    pub fn new() -> Self {
        log::debug!("Creating Sounds with {} entries", SOUND_NAMES.len());
        Self {
            master_volume: Param::new(0.0),
            muted: false,
            played: Vec::new(),
            play_counts: SOUND_NAMES.iter().map(|name| ((*name).to_string(), 0)).collect(),
        }
    }

    /// Trigger a one-shot sound, returns false for unknown names or while muted
    pub fn play(&mut self, name: &str) -> bool {
        let Some(count) = self.play_counts.get_mut(name) else {
            log::warn!("Unknown sound '{}'", name);
            return false;
        };
        if self.muted {
            return false;
        }
        *count += 1;
        self.played.push(name.to_string());
        log::debug!("Playing sound '{}' at volume {:.2}", name, self.master_volume.get());
        true
    }

    /// Master volume parameter, shared with tweens
    pub fn master_volume(&self) -> &Param {
        &self.master_volume
    }

    /// Set the master volume, clamped to `[0, 1]`
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume.set(volume.clamp(0.0, 1.0));
    }

    /// Effective volume after mute
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.get()
        }
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        log::info!("Sound {}", if self.muted { "muted" } else { "unmuted" });
    }

    /// True while muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Every sound played so far, in order
    pub fn played(&self) -> &[String] {
        &self.played
    }

    /// How many times `name` was played
    pub fn play_count(&self, name: &str) -> u32 {
        self.play_counts.get(name).copied().unwrap_or(0)
    }
}

impl Default for Sounds {
    fn default() -> Self {
        Self::new()
    }
}
