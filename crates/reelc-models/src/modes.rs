//! Run-level policy enums: segment ordering, subtitle placement,
//! background-music selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How segments are ordered on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConcatMode {
    /// Source order, one segment per source clip.
    #[default]
    Sequential,
    /// Every segment, shuffled once before allocation.
    Random,
}

impl ConcatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcatMode::Sequential => "sequential",
            ConcatMode::Random => "random",
        }
    }
}

impl fmt::Display for ConcatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConcatMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(ConcatMode::Sequential),
            "random" => Ok(ConcatMode::Random),
            _ => Err(ModeParseError("concat mode", s.to_string())),
        }
    }
}

/// Vertical placement of subtitle blocks on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubtitlePosition {
    Top,
    #[default]
    Bottom,
    Center,
    /// Offset given as a 0-100 percentage of the free vertical space.
    Custom,
}

impl SubtitlePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitlePosition::Top => "top",
            SubtitlePosition::Bottom => "bottom",
            SubtitlePosition::Center => "center",
            SubtitlePosition::Custom => "custom",
        }
    }
}

impl fmt::Display for SubtitlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubtitlePosition {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(SubtitlePosition::Top),
            "bottom" => Ok(SubtitlePosition::Bottom),
            "center" => Ok(SubtitlePosition::Center),
            "custom" => Ok(SubtitlePosition::Custom),
            _ => Err(ModeParseError("subtitle position", s.to_string())),
        }
    }
}

/// Where the background-music track comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BgmKind {
    /// No background music.
    #[default]
    None,
    /// A random song from the configured songs directory.
    Random,
    /// An explicitly configured file.
    File,
}

impl BgmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BgmKind::None => "none",
            BgmKind::Random => "random",
            BgmKind::File => "file",
        }
    }
}

impl fmt::Display for BgmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BgmKind {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(BgmKind::None),
            "random" => Ok(BgmKind::Random),
            "file" => Ok(BgmKind::File),
            _ => Err(ModeParseError("bgm kind", s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown {0}: {1}")]
pub struct ModeParseError(&'static str, String);
