//! Canvas geometry and aspect selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed portrait canvas (9:16, Shorts/Reels).
pub const PORTRAIT_CANVAS: Canvas = Canvas::new(1080, 1920);

/// Fixed landscape canvas (16:9).
pub const LANDSCAPE_CANVAS: Canvas = Canvas::new(1920, 1080);

/// Target orientation for a composition run.
///
/// Each aspect maps to exactly one output resolution; the canvas never
/// changes mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoAspect {
    #[default]
    Portrait,
    Landscape,
}

impl VideoAspect {
    /// Resolve the aspect to its fixed output canvas.
    pub const fn resolution(&self) -> Canvas {
        match self {
            VideoAspect::Portrait => PORTRAIT_CANVAS,
            VideoAspect::Landscape => LANDSCAPE_CANVAS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoAspect::Portrait => "portrait",
            VideoAspect::Landscape => "landscape",
        }
    }
}

impl fmt::Display for VideoAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoAspect {
    type Err = AspectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "portrait" => Ok(VideoAspect::Portrait),
            "landscape" => Ok(VideoAspect::Landscape),
            _ => Err(AspectParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown video aspect: {0}")]
pub struct AspectParseError(String);

/// Output frame size in pixels, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height as a decimal.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
