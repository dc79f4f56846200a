//! Session state and playback preferences

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// What the one session controller is currently doing. Recording and
/// Playing are mutually exclusive; transitions gate every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Recording,
    Playing,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Playing => "playing",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback preferences. Invalid values never replace stored valid ones;
/// callers validate before storing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Time divisor: 2.0 replays twice as fast, 0.5 at half speed.
    pub speed: f64,
    /// How many times the full log is replayed. At least 1.
    pub repeats: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { speed: 1.0, repeats: 1 }
    }
}

impl PlaybackConfig {
    pub fn new(speed: f64, repeats: u32) -> Self {
        Self { speed, repeats }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        if self.repeats == 0 {
            return Err(Error::InvalidConfig("repeats must be at least 1".into()));
        }
        Ok(())
    }
}
