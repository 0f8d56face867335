//! Contain-fit of arbitrary source frames into the fixed canvas.
//!
//! A single scale factor fits the frame inside the canvas; the remainder
//! is opaque black padding. Content is never cropped and its aspect ratio
//! is never distorted.

use reelc_models::aspect::Canvas;

/// Placement of a scaled frame inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    pub canvas: Canvas,
    /// Frame size after uniform scaling.
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Centered padding offsets.
    pub pad_left: u32,
    pub pad_top: u32,
}

impl FitPlan {
    /// Compute the contain-fit of a `frame_width`×`frame_height` source.
    pub fn compute(frame_width: u32, frame_height: u32, canvas: Canvas) -> Self {
        // ratio equality on cross products, no float comparison
        let same_ratio = frame_width as u64 * canvas.height as u64
            == frame_height as u64 * canvas.width as u64;
        if same_ratio {
            return Self {
                canvas,
                scaled_width: canvas.width,
                scaled_height: canvas.height,
                pad_left: 0,
                pad_top: 0,
            };
        }

        let scale_x = canvas.width as f64 / frame_width as f64;
        let scale_y = canvas.height as f64 / frame_height as f64;
        let scale = scale_x.min(scale_y);

        let scaled_width = ((frame_width as f64 * scale).round() as u32).min(canvas.width);
        let scaled_height = ((frame_height as f64 * scale).round() as u32).min(canvas.height);

        Self {
            canvas,
            scaled_width,
            scaled_height,
            pad_left: (canvas.width - scaled_width) / 2,
            pad_top: (canvas.height - scaled_height) / 2,
        }
    }

    /// True when the frame fills the canvas without padding.
    pub fn is_exact(&self) -> bool {
        self.scaled_width == self.canvas.width && self.scaled_height == self.canvas.height
    }

    /// FFmpeg chain producing an exactly canvas-sized frame.
    pub fn to_filter(&self) -> String {
        if self.is_exact() {
            format!("scale={}:{}", self.canvas.width, self.canvas.height)
        } else {
            format!(
                "scale={}:{},pad={}:{}:{}:{}:black",
                self.scaled_width,
                self.scaled_height,
                self.canvas.width,
                self.canvas.height,
                self.pad_left,
                self.pad_top
            )
        }
    }
}
