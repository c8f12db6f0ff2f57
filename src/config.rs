//! Playback configuration — read-only settings input.
//!
//! Supplied by the embedding application's settings layer; the pipeline
//! reads it on every drain but never mutates it.

use serde::{Deserialize, Serialize};

/// Bounds applied to pitch and rate before a request is submitted.
const PITCH_RATE_RANGE: (f32, f32) = (0.5, 2.0);

/// User playback preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfig {
    /// Preferred voice id, if the user picked one. `None` lets the
    /// selector fall through its quality heuristics.
    pub preferred_voice: Option<String>,

    /// Pitch multiplier (0.5–2.0, default 1.0).
    pub pitch: f32,

    /// Speaking-rate multiplier (0.5–2.0, default 1.0).
    pub rate: f32,

    /// Target language for voice selection (BCP-47 tag or bare primary
    /// subtag, e.g. `"en"` or `"fr-CA"`).
    pub language: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            preferred_voice: None,
            pitch: 1.0,
            rate: 1.0,
            language: "en".to_string(),
        }
    }
}

impl PlaybackConfig {
    /// Pitch clamped to the supported range.
    #[must_use]
    pub fn clamped_pitch(&self) -> f32 {
        self.pitch.clamp(PITCH_RATE_RANGE.0, PITCH_RATE_RANGE.1)
    }

    /// Rate clamped to the supported range.
    #[must_use]
    pub fn clamped_rate(&self) -> f32 {
        self.rate.clamp(PITCH_RATE_RANGE.0, PITCH_RATE_RANGE.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_neutral() {
        let config = PlaybackConfig::default();
        assert!(config.preferred_voice.is_none());
        assert!((config.pitch - 1.0).abs() < f32::EPSILON);
        assert!((config.rate - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.language, "en");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = PlaybackConfig {
            pitch: 9.0,
            rate: 0.01,
            ..PlaybackConfig::default()
        };
        assert!((config.clamped_pitch() - 2.0).abs() < f32::EPSILON);
        assert!((config.clamped_rate() - 0.5).abs() < f32::EPSILON);
    }
}
