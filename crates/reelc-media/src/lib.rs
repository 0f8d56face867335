#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the ReelCraft composition core.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with any number of ordered inputs
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe-based media probing with video/image capability resolution
//! - Font metrics for subtitle measurement (fontdue; no rasterization)
//! - Filter-string builders and the render driver that turns a finished
//!   composition model into the muxed output file

pub mod command;
pub mod error;
pub mod filters;
pub mod fonts;
pub mod probe;
pub mod render;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegProgress, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use filters::SubtitleStyle;
pub use fonts::{LoadedFont, TextMeasurer};
pub use probe::{probe_audio_duration, probe_media, MediaClip, MediaInfo, MediaKind};
pub use render::{combined_temp_path, concat_segments, render_final, RenderSegment};
