//! Audio mix plan data.
//!
//! The mixer plans lanes; the render driver turns the plan into an FFmpeg
//! filter graph. Tracks are summed additively with no loudness
//! normalization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Seconds of fade applied to the tail of the background-music track.
pub const BGM_FADE_OUT_SECS: f64 = 3.0;

/// What a track contributes to the mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioRole {
    /// The narration/voice-over that defines the target duration.
    Narration,
    /// On-camera audio retained from the combined video.
    Original,
    /// Looped, faded background music.
    Background,
}

/// Where a track's samples come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// A standalone audio file fed to FFmpeg as its own input.
    File(PathBuf),
    /// The audio stream already muxed into the combined video input.
    VideoStream,
}

/// One input lane of the final mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub role: AudioRole,
    pub source: AudioSource,
    /// Volume multiplier applied before mixing.
    pub volume: f64,
    /// Loop the source until it covers this many seconds.
    pub loop_to: Option<f64>,
    /// Fade-out length applied at the end of the covered window.
    pub fade_out: Option<f64>,
}

impl AudioTrack {
    /// Narration lane; always the first track of a plan.
    pub fn narration(path: PathBuf, volume: f64) -> Self {
        Self {
            role: AudioRole::Narration,
            source: AudioSource::File(path),
            volume,
            loop_to: None,
            fade_out: None,
        }
    }

    /// Retained on-camera audio, read from the combined video stream.
    pub fn original(volume: f64) -> Self {
        Self {
            role: AudioRole::Original,
            source: AudioSource::VideoStream,
            volume,
            loop_to: None,
            fade_out: None,
        }
    }

    /// Background music looped to `duration` with the fixed tail fade.
    pub fn background(path: PathBuf, volume: f64, duration: f64) -> Self {
        Self {
            role: AudioRole::Background,
            source: AudioSource::File(path),
            volume,
            loop_to: Some(duration),
            fade_out: Some(BGM_FADE_OUT_SECS),
        }
    }
}

/// The complete, ordered audio mix for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMixPlan {
    /// Mix lanes; narration first.
    pub tracks: Vec<AudioTrack>,
    /// Video duration the mix is aligned to, seconds.
    pub duration: f64,
}

impl AudioMixPlan {
    pub fn has_background(&self) -> bool {
        self.tracks.iter().any(|t| t.role == AudioRole::Background)
    }

    pub fn has_original(&self) -> bool {
        self.tracks.iter().any(|t| t.role == AudioRole::Original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_track_loops_and_fades() {
        let track = AudioTrack::background(PathBuf::from("song.mp3"), 0.2, 30.0);
        assert_eq!(track.loop_to, Some(30.0));
        assert_eq!(track.fade_out, Some(BGM_FADE_OUT_SECS));
        assert_eq!(track.role, AudioRole::Background);
    }

    #[test]
    fn test_narration_track_is_plain() {
        let track = AudioTrack::narration(PathBuf::from("voice.mp3"), 1.0);
        assert_eq!(track.loop_to, None);
        assert_eq!(track.fade_out, None);
    }

    #[test]
    fn test_plan_queries() {
        let plan = AudioMixPlan {
            tracks: vec![
                AudioTrack::narration(PathBuf::from("voice.mp3"), 1.0),
                AudioTrack::original(1.0),
            ],
            duration: 12.0,
        };
        assert!(plan.has_original());
        assert!(!plan.has_background());
    }
}
