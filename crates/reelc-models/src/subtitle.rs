//! Subtitle cues and positioned blocks.
//!
//! Cues come from a line-based SRT-style source: blocks of an optional
//! numeric index, a `start --> end` timing line, and one or more text
//! lines, separated by blank lines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timestamp::{parse_timestamp, TimestampError};

/// One timed caption from the subtitle source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Position in the source file, 1-based.
    pub index: usize,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Caption text with source line breaks collapsed to spaces.
    pub text: String,
}

impl SubtitleCue {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A cue after wrapping and placement: what the render driver overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleBlock {
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
    /// Total block height in canvas pixels.
    pub height: f64,
    /// Vertical offset of the block's top edge, canvas pixels.
    pub y: f64,
    /// Overlay window start, seconds.
    pub start: f64,
    /// Overlay window end, seconds.
    pub end: f64,
}

impl SubtitleBlock {
    /// The block as a single string with line breaks.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Parse SRT-style content into cues ordered by start time.
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleCue>, SubtitleError> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in content.split("\n\n").map(str::trim) {
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines().map(str::trim).peekable();

        // optional numeric index line
        let index = match lines.peek() {
            Some(first) if first.parse::<usize>().is_ok() => {
                let idx = first.parse::<usize>().unwrap_or(cues.len() + 1);
                lines.next();
                idx
            }
            _ => cues.len() + 1,
        };

        let timing = lines
            .next()
            .ok_or_else(|| SubtitleError::MissingTiming { index })?;
        let (start_raw, end_raw) = timing
            .split_once("-->")
            .ok_or_else(|| SubtitleError::MissingTiming { index })?;
        let start = parse_timestamp(start_raw).map_err(|source| SubtitleError::BadTimestamp {
            index,
            source,
        })?;
        let end = parse_timestamp(end_raw).map_err(|source| SubtitleError::BadTimestamp {
            index,
            source,
        })?;
        if end < start {
            return Err(SubtitleError::EndBeforeStart { index });
        }

        let text = lines.collect::<Vec<_>>().join(" ").trim().to_string();
        if text.is_empty() {
            continue;
        }

        cues.push(SubtitleCue {
            index,
            start,
            end,
            text,
        });
    }

    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok(cues)
}

/// Subtitle source parsing error.
#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("cue {index}: missing or malformed timing line")]
    MissingTiming { index: usize },

    #[error("cue {index}: bad timestamp: {source}")]
    BadTimestamp {
        index: usize,
        source: TimestampError,
    },

    #[error("cue {index}: end time precedes start time")]
    EndBeforeStart { index: usize },
}
