//! Composition run configuration.
//!
//! A [`CompositionConfig`] is built once per run, validated up front, and
//! then only ever read. Components receive it by reference and never write
//! back into it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::aspect::{Canvas, VideoAspect};
use crate::encoding::EncodingConfig;
use crate::modes::{BgmKind, ConcatMode, SubtitlePosition};

/// Default upper bound on a single timeline entry, in seconds.
pub const DEFAULT_MAX_CLIP_SECS: f64 = 5.0;
/// Default subtitle font size in canvas pixels.
pub const DEFAULT_FONT_SIZE: u32 = 60;
/// Default subtitle font file name, resolved against the fonts directory.
pub const DEFAULT_FONT_NAME: &str = "STHeitiMedium.ttc";
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.5;
pub const DEFAULT_VOICE_VOLUME: f64 = 1.0;
pub const DEFAULT_ORIGINAL_VOLUME: f64 = 1.0;
pub const DEFAULT_BGM_VOLUME: f64 = 0.2;
/// Default custom subtitle offset, percent of free vertical space.
pub const DEFAULT_CUSTOM_POSITION: f64 = 70.0;

/// Immutable per-run configuration for the composition pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionConfig {
    #[serde(default)]
    pub video_aspect: VideoAspect,

    #[serde(default)]
    pub concat_mode: ConcatMode,

    /// Upper bound on any single segment/timeline entry, seconds.
    #[serde(default = "default_max_clip_secs")]
    pub max_clip_secs: f64,

    /// Narration volume multiplier.
    #[serde(default = "default_voice_volume")]
    pub voice_volume: f64,

    /// Volume multiplier for retained on-camera audio.
    #[serde(default = "default_original_volume")]
    pub original_volume: f64,

    #[serde(default)]
    pub bgm: BgmKind,

    /// Explicit music file, used when `bgm` is [`BgmKind::File`].
    #[serde(default)]
    pub bgm_file: Option<PathBuf>,

    #[serde(default = "default_bgm_volume")]
    pub bgm_volume: f64,

    #[serde(default = "default_subtitle_enabled")]
    pub subtitle_enabled: bool,

    /// Font file name, resolved against the run's fonts directory.
    #[serde(default = "default_font_name")]
    pub font_name: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_text_color")]
    pub text_fore_color: String,

    /// Text box fill; `None` renders without a box.
    #[serde(default)]
    pub text_background_color: Option<String>,

    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    #[serde(default)]
    pub subtitle_position: SubtitlePosition,

    /// Percent of free vertical space, 0-100; only read in custom mode.
    #[serde(default = "default_custom_position")]
    pub custom_position: f64,

    #[serde(default)]
    pub encoding: EncodingConfig,
}

fn default_max_clip_secs() -> f64 {
    DEFAULT_MAX_CLIP_SECS
}
fn default_voice_volume() -> f64 {
    DEFAULT_VOICE_VOLUME
}
fn default_original_volume() -> f64 {
    DEFAULT_ORIGINAL_VOLUME
}
fn default_bgm_volume() -> f64 {
    DEFAULT_BGM_VOLUME
}
fn default_subtitle_enabled() -> bool {
    true
}
fn default_font_name() -> String {
    DEFAULT_FONT_NAME.to_string()
}
fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}
fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}
fn default_stroke_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}
fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}
fn default_custom_position() -> f64 {
    DEFAULT_CUSTOM_POSITION
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            video_aspect: VideoAspect::default(),
            concat_mode: ConcatMode::default(),
            max_clip_secs: DEFAULT_MAX_CLIP_SECS,
            voice_volume: DEFAULT_VOICE_VOLUME,
            original_volume: DEFAULT_ORIGINAL_VOLUME,
            bgm: BgmKind::default(),
            bgm_file: None,
            bgm_volume: DEFAULT_BGM_VOLUME,
            subtitle_enabled: true,
            font_name: default_font_name(),
            font_size: DEFAULT_FONT_SIZE,
            text_fore_color: default_text_color(),
            text_background_color: None,
            stroke_color: default_stroke_color(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            subtitle_position: SubtitlePosition::default(),
            custom_position: DEFAULT_CUSTOM_POSITION,
            encoding: EncodingConfig::default(),
        }
    }
}

impl CompositionConfig {
    /// The fixed output canvas for this run.
    pub fn canvas(&self) -> Canvas {
        self.video_aspect.resolution()
    }

    /// Reject impossible configurations before any media is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_clip_secs.is_finite() || self.max_clip_secs <= 0.0 {
            return Err(ConfigError::NonPositiveClipDuration(self.max_clip_secs));
        }
        for (name, volume) in [
            ("voice_volume", self.voice_volume),
            ("original_volume", self.original_volume),
            ("bgm_volume", self.bgm_volume),
        ] {
            if !volume.is_finite() || volume < 0.0 {
                return Err(ConfigError::InvalidVolume { name, volume });
            }
        }
        if self.font_size == 0 {
            return Err(ConfigError::ZeroFontSize);
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(ConfigError::InvalidStrokeWidth(self.stroke_width));
        }
        if self.subtitle_position == SubtitlePosition::Custom
            && !(0.0..=100.0).contains(&self.custom_position)
        {
            return Err(ConfigError::OffsetOutOfRange(self.custom_position));
        }
        if self.bgm == BgmKind::File && self.bgm_file.is_none() {
            return Err(ConfigError::MissingBgmFile);
        }
        if self.encoding.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

/// Fatal configuration errors, surfaced before any rendering starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max clip duration must be positive, got {0}")]
    NonPositiveClipDuration(f64),

    #[error("{name} must be a non-negative finite number, got {volume}")]
    InvalidVolume { name: &'static str, volume: f64 },

    #[error("font size must be positive")]
    ZeroFontSize,

    #[error("stroke width must be a non-negative finite number, got {0}")]
    InvalidStrokeWidth(f64),

    #[error("custom subtitle position must be within 0-100, got {0}")]
    OffsetOutOfRange(f64),

    #[error("bgm kind is 'file' but no bgm_file is configured")]
    MissingBgmFile,

    #[error("encoder thread count must be positive")]
    ZeroThreads,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = CompositionConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.video_aspect, VideoAspect::Portrait);
        assert!((cfg.max_clip_secs - 5.0).abs() < f64::EPSILON);
        assert!(cfg.subtitle_enabled);
    }

    #[test]
    fn test_canvas_follows_aspect() {
        let cfg = CompositionConfig {
            video_aspect: VideoAspect::Landscape,
            ..Default::default()
        };
        assert_eq!(cfg.canvas(), Canvas::new(1920, 1080));
    }

    #[test]
    fn test_rejects_bad_clip_duration() {
        let cfg = CompositionConfig {
            max_clip_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositiveClipDuration(_))
        ));
    }

    #[test]
    fn test_rejects_negative_volume() {
        let cfg = CompositionConfig {
            bgm_volume: -0.5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidVolume { .. })));
    }

    #[test]
    fn test_custom_offset_range() {
        let mut cfg = CompositionConfig {
            subtitle_position: SubtitlePosition::Custom,
            custom_position: 130.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::OffsetOutOfRange(_))));
        cfg.custom_position = 70.0;
        cfg.validate().unwrap();
    }

    #[test]
    fn test_offset_ignored_outside_custom_mode() {
        let cfg = CompositionConfig {
            subtitle_position: SubtitlePosition::Bottom,
            custom_position: 130.0,
            ..Default::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn test_file_bgm_requires_path() {
        let cfg = CompositionConfig {
            bgm: BgmKind::File,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingBgmFile)));
    }

    #[test]
    fn test_deserialize_with_unknown_enum_fails() {
        let result = serde_json::from_str::<CompositionConfig>(
            r#"{"video_aspect": "diagonal"}"#,
        );
        assert!(result.is_err());
    }
}
