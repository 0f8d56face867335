//! Output encoding configuration.

use serde::{Deserialize, Serialize};

/// Constant output frame rate; every timeline entry is normalized to it.
pub const OUTPUT_FPS: u32 = 30;

/// One frame interval at [`OUTPUT_FPS`]; the timeline duration tolerance.
pub const FRAME_INTERVAL_SECS: f64 = 1.0 / OUTPUT_FPS as f64;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Default FFmpeg thread count
pub const DEFAULT_THREADS: u32 = 2;

/// Video encoding configuration handed to the render driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// FFmpeg worker threads; encode throughput only, never ordering
    #[serde(default = "default_threads")]
    pub threads: u32,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_threads() -> u32 {
    DEFAULT_THREADS
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_video_codec(),
            preset: default_preset(),
            crf: DEFAULT_CRF,
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            threads: DEFAULT_THREADS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let enc = EncodingConfig::default();
        assert_eq!(enc.codec, "libx264");
        assert_eq!(enc.audio_codec, "aac");
        assert_eq!(enc.threads, 2);
    }

    #[test]
    fn test_deserialize_partial() {
        let enc: EncodingConfig = serde_json::from_str(r#"{"preset": "slow"}"#).unwrap();
        assert_eq!(enc.preset, "slow");
        assert_eq!(enc.crf, DEFAULT_CRF);
    }

    #[test]
    fn test_frame_interval() {
        assert!((FRAME_INTERVAL_SECS - 1.0 / 30.0).abs() < 1e-12);
    }
}
