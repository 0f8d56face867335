//! Clip segmentation into bounded-duration chunks.

use std::sync::Arc;

use reelc_media::{MediaClip, MediaKind};

/// Display duration given to still-image sources, seconds.
pub const IMAGE_SEGMENT_SECS: f64 = 4.0;

/// Which chunks of a source survive segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKeep {
    /// Keep only the first chunk of each source.
    ///
    /// TODO: confirm with product whether sequential mode should map every
    /// chunk; first-only matches the shipped behavior.
    FirstOnly,
    /// Keep every chunk.
    All,
}

/// A bounded, non-overlapping slice of a source clip.
#[derive(Debug, Clone)]
pub struct ClipSegment {
    clip: Arc<MediaClip>,
    start: f64,
    end: f64,
    keep_original_audio: bool,
}

impl ClipSegment {
    pub fn clip(&self) -> &MediaClip {
        &self.clip
    }

    /// In-point within the source, seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Out-point within the source, seconds.
    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.clip.frame_size()
    }

    /// Whether this segment's native audio rides into the mix (OST).
    pub fn keep_original_audio(&self) -> bool {
        self.keep_original_audio && self.clip.has_audio()
    }
}

/// Split a clip into consecutive chunks no longer than `max_clip_secs`,
/// the last one truncated to the remainder.
///
/// Still images become a single [`IMAGE_SEGMENT_SECS`] chunk (bounded by
/// `max_clip_secs` like everything else). Zero-duration clips yield an
/// empty list.
pub fn split_clip(
    clip: Arc<MediaClip>,
    max_clip_secs: f64,
    keep: SegmentKeep,
    keep_original_audio: bool,
) -> Vec<ClipSegment> {
    // Stills have no native duration; they contribute exactly one chunk.
    if clip.kind() == MediaKind::Image {
        return vec![ClipSegment {
            clip,
            start: 0.0,
            end: IMAGE_SEGMENT_SECS.min(max_clip_secs),
            keep_original_audio,
        }];
    }

    let total = clip.duration();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < total {
        let end = (start + max_clip_secs).min(total);
        segments.push(ClipSegment {
            clip: Arc::clone(&clip),
            start,
            end,
            keep_original_audio,
        });
        start = end;
        if keep == SegmentKeep::FirstOnly {
            break;
        }
    }

    segments
}
