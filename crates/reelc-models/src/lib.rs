//! Shared data models for the ReelCraft composition core.
//!
//! This crate provides Serde-serializable types for:
//! - Canvas geometry and aspect selection
//! - Concat / subtitle-position / background-music policies
//! - The immutable per-run composition configuration
//! - Subtitle cues and positioned blocks
//! - Audio mix plans

pub mod aspect;
pub mod audio;
pub mod config;
pub mod encoding;
pub mod modes;
pub mod subtitle;
pub mod timestamp;

// Re-export common types
pub use aspect::{Canvas, VideoAspect};
pub use audio::{AudioMixPlan, AudioRole, AudioSource, AudioTrack, BGM_FADE_OUT_SECS};
pub use config::{CompositionConfig, ConfigError};
pub use encoding::{EncodingConfig, FRAME_INTERVAL_SECS, OUTPUT_FPS};
pub use modes::{BgmKind, ConcatMode, SubtitlePosition};
pub use subtitle::{parse_srt, SubtitleBlock, SubtitleCue, SubtitleError};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
