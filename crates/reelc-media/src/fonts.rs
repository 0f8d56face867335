//! Font loading and text measurement for subtitle layout.
//!
//! Only advance widths and line metrics are read here; glyph
//! rasterization stays with the render collaborator (FFmpeg `drawtext`).

use fontdue::{Font, FontSettings};
use std::path::Path;

use crate::error::{MediaError, MediaResult};

/// Measures rendered text at a fixed pixel size.
pub trait TextMeasurer {
    /// Width of `text` in canvas pixels.
    fn text_width(&self, text: &str) -> f64;

    /// Height of a single laid-out line.
    fn line_height(&self) -> f64;
}

/// A font face loaded from disk, measured at a fixed pixel size.
#[derive(Debug)]
pub struct LoadedFont {
    font: Font,
    px: f32,
    line_height: f64,
}

impl LoadedFont {
    /// Load a font file and fix its measurement size.
    pub fn load(path: impl AsRef<Path>, px: u32) -> MediaResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| MediaError::font_load(path, e.to_string()))?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| MediaError::font_load(path, e))?;

        let px = px as f32;
        let line_height = font
            .horizontal_line_metrics(px)
            .map(|m| m.new_line_size as f64)
            // fallback for fonts without horizontal metrics
            .unwrap_or(px as f64 * 1.2);

        Ok(Self {
            font,
            px,
            line_height,
        })
    }

    pub fn size_px(&self) -> f32 {
        self.px
    }
}

impl TextMeasurer for LoadedFont {
    fn text_width(&self, text: &str) -> f64 {
        text.chars()
            .map(|ch| self.font.metrics(ch, self.px).advance_width as f64)
            .sum()
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }
}
