//! Timeline composition core for short-form video assembly.
//!
//! Takes heterogeneous raw footage, narration audio, optional on-camera
//! audio, background music and timed subtitle cues, and builds the
//! validated composition model (timeline, audio mix plan, positioned
//! subtitle overlays) that the render driver in `reelc-media` turns into
//! one canvas-sized output video.
//!
//! The pipeline is synchronous and single-pass: it runs to completion or
//! fails before any output is written.

pub mod audio;
pub mod error;
pub mod fit;
pub mod pipeline;
pub mod segmenter;
pub mod subtitle;
pub mod timeline;

pub use error::{ComposeError, ComposeResult};
pub use fit::FitPlan;
pub use pipeline::{compose, ComposeRequest, SourceEntry};
pub use segmenter::{split_clip, ClipSegment, SegmentKeep, IMAGE_SEGMENT_SECS};
pub use subtitle::{layout_cues, vertical_offset, wrap_text, LINE_WIDTH_RATIO, POSITION_MARGIN};
pub use timeline::{allocate, allocate_with_rng, Timeline, TimelineEntry};
