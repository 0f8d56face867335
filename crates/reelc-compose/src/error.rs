//! Error types for the composition pipeline.

use thiserror::Error;

use reelc_media::MediaError;
use reelc_models::config::ConfigError;

/// Result type for composition operations.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors that abort a composition run.
///
/// Everything here is fatal by design; recoverable conditions (missing
/// background music, unreadable subtitles) are logged and degraded at the
/// call site instead of surfacing as errors.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("segment pool is empty; cannot cover a {target:.2}s target")]
    EmptySegmentPool { target: f64 },

    #[error("target duration must be positive, got {0:.3}s")]
    NonPositiveTarget(f64),
}
