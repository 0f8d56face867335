//! Once-per-run composition pipeline.
//!
//! Validates the configuration, probes every source, builds the full
//! timeline/audio/subtitle model, and only then hands it to the render
//! driver. Fatal errors abort before any output is written; the
//! background-music and subtitle stages degrade gracefully instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use reelc_media::{self as media, LoadedFont, MediaClip, RenderSegment, SubtitleStyle};
use reelc_models::config::CompositionConfig;
use reelc_models::modes::ConcatMode;
use reelc_models::subtitle::{parse_srt, SubtitleBlock};
use reelc_models::Canvas;

use crate::audio;
use crate::error::{ComposeError, ComposeResult};
use crate::segmenter::{split_clip, SegmentKeep};
use crate::subtitle::layout_cues;
use crate::timeline::{allocate, TimelineEntry};

/// One raw footage entry.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub path: PathBuf,
    /// Retain this source's native audio in the final mix (OST).
    pub keep_original_audio: bool,
}

impl SourceEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep_original_audio: false,
        }
    }

    pub fn with_original_audio(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep_original_audio: true,
        }
    }
}

/// Everything a composition run needs, fixed up front.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Raw footage, in source order.
    pub sources: Vec<SourceEntry>,
    /// Narration audio; its duration is the timeline target.
    pub narration: PathBuf,
    /// Subtitle source; missing or unreadable skips subtitles.
    pub subtitles: Option<PathBuf>,
    /// Directory searched for random background music.
    pub songs_dir: Option<PathBuf>,
    /// Directory the configured font name resolves against.
    pub fonts_dir: Option<PathBuf>,
    /// Final container path; temp artifacts land in the same directory.
    pub output: PathBuf,
    pub config: CompositionConfig,
}

/// Run the whole pipeline: segment, allocate, lay out, mix, render.
pub async fn compose(request: &ComposeRequest) -> ComposeResult<()> {
    let cfg = &request.config;
    cfg.validate()?;
    let canvas = cfg.canvas();

    info!(
        output = %request.output.display(),
        canvas = %canvas,
        concat_mode = %cfg.concat_mode,
        sources = request.sources.len(),
        "starting composition"
    );

    // The narration defines how much timeline must be covered.
    let target = media::probe_audio_duration(&request.narration).await?;
    if target <= 0.0 {
        return Err(ComposeError::NonPositiveTarget(target));
    }
    info!(narration_secs = target, "narration probed");

    // Open and segment every source; an unreadable source is fatal.
    let keep = match cfg.concat_mode {
        ConcatMode::Sequential => SegmentKeep::FirstOnly,
        ConcatMode::Random => SegmentKeep::All,
    };
    let mut pool = Vec::new();
    for entry in &request.sources {
        let clip = Arc::new(MediaClip::open(&entry.path).await?);
        pool.extend(split_clip(
            clip,
            cfg.max_clip_secs,
            keep,
            entry.keep_original_audio,
        ));
    }
    if pool.is_empty() {
        return Err(ComposeError::EmptySegmentPool { target });
    }
    info!(segments = pool.len(), "segment pool built");

    let timeline = allocate(pool, target, cfg.concat_mode, cfg.max_clip_secs, canvas)?;
    info!(
        entries = timeline.len(),
        total_secs = timeline.total_duration(),
        "timeline allocated"
    );

    let blocks = if cfg.subtitle_enabled {
        load_subtitles(request, canvas, target)
    } else {
        Vec::new()
    };

    let bgm = audio::resolve_bgm(cfg.bgm, cfg.bgm_file.as_deref(), request.songs_dir.as_deref());
    let any_original = request
        .sources
        .iter()
        .any(|entry| entry.keep_original_audio);
    let plan = audio::plan_mix(
        &request.narration,
        cfg.voice_volume,
        any_original.then_some(cfg.original_volume),
        bgm.as_deref(),
        cfg.bgm_volume,
        target,
    )
    .await;

    // Model complete; only now does the render driver run. The combined
    // intermediate is deleted on every exit path, including errors.
    let combined = media::combined_temp_path(&request.output)?;
    let segments: Vec<RenderSegment> = timeline.entries().iter().map(to_render_segment).collect();
    media::concat_segments(&segments, &combined, &cfg.encoding).await?;

    let style = subtitle_style(request);
    media::render_final(
        &combined,
        &plan,
        &blocks,
        &style,
        &request.output,
        &cfg.encoding,
    )
    .await?;

    info!(output = %request.output.display(), "composition complete");
    Ok(())
}

/// Parse and lay out the subtitle source. Every failure here degrades to
/// "no subtitles" with a logged reason; nothing aborts the run.
fn load_subtitles(request: &ComposeRequest, canvas: Canvas, video_duration: f64) -> Vec<SubtitleBlock> {
    let cfg = &request.config;
    let Some(path) = &request.subtitles else {
        return Vec::new();
    };

    if !path.exists() {
        warn!(path = %path.display(), "subtitle source missing, rendering without subtitles");
        return Vec::new();
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read subtitle source, skipping subtitles");
            return Vec::new();
        }
    };
    let cues = match parse_srt(&content) {
        Ok(cues) => cues,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot parse subtitle source, skipping subtitles");
            return Vec::new();
        }
    };

    let font_path = resolve_font(request);
    let font = match LoadedFont::load(&font_path, cfg.font_size) {
        Ok(font) => font,
        Err(e) => {
            warn!(error = %e, "font unavailable, skipping subtitles");
            return Vec::new();
        }
    };

    layout_cues(
        &cues,
        canvas,
        cfg.subtitle_position,
        cfg.custom_position,
        video_duration,
        &font,
    )
}

/// The configured font name resolved against the fonts directory.
fn resolve_font(request: &ComposeRequest) -> PathBuf {
    match &request.fonts_dir {
        Some(dir) => dir.join(&request.config.font_name),
        None => PathBuf::from(&request.config.font_name),
    }
}

fn subtitle_style(request: &ComposeRequest) -> SubtitleStyle {
    let cfg = &request.config;
    SubtitleStyle {
        font_file: resolve_font(request),
        font_size: cfg.font_size,
        fore_color: cfg.text_fore_color.clone(),
        background_color: cfg
            .text_background_color
            .clone()
            .filter(|color| !color.eq_ignore_ascii_case("transparent")),
        stroke_color: cfg.stroke_color.clone(),
        stroke_width: cfg.stroke_width,
    }
}

fn to_render_segment(entry: &TimelineEntry) -> RenderSegment {
    let segment = &entry.segment;
    let clip = segment.clip();
    RenderSegment {
        path: clip.path().to_path_buf(),
        start: segment.start(),
        duration: entry.duration,
        fit_filter: entry.fit.to_filter(),
        keep_audio: segment.keep_original_audio(),
        has_audio: clip.has_audio(),
        is_image: clip.kind() == media::MediaKind::Image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelc_models::modes::SubtitlePosition;

    fn request_with(config: CompositionConfig) -> ComposeRequest {
        ComposeRequest {
            sources: vec![SourceEntry::new("a.mp4")],
            narration: PathBuf::from("voice.mp3"),
            subtitles: None,
            songs_dir: None,
            fonts_dir: Some(PathBuf::from("/fonts")),
            output: PathBuf::from("/tmp/out/final.mp4"),
            config,
        }
    }

    #[test]
    fn test_resolve_font_joins_dir() {
        let request = request_with(CompositionConfig::default());
        assert_eq!(
            resolve_font(&request),
            PathBuf::from("/fonts").join(&request.config.font_name)
        );
    }

    #[test]
    fn test_transparent_background_means_no_box() {
        let config = CompositionConfig {
            text_background_color: Some("transparent".into()),
            ..Default::default()
        };
        let style = subtitle_style(&request_with(config));
        assert!(style.background_color.is_none());

        let config = CompositionConfig {
            text_background_color: Some("black@0.4".into()),
            ..Default::default()
        };
        let style = subtitle_style(&request_with(config));
        assert_eq!(style.background_color.as_deref(), Some("black@0.4"));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_probing() {
        let config = CompositionConfig {
            subtitle_position: SubtitlePosition::Custom,
            custom_position: 250.0,
            ..Default::default()
        };
        let err = compose(&request_with(config)).await.unwrap_err();
        assert!(matches!(err, ComposeError::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_narration_is_fatal() {
        let mut request = request_with(CompositionConfig::default());
        request.narration = PathBuf::from("/nonexistent/voice.mp3");
        let err = compose(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Media(media::MediaError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_missing_subtitle_source_degrades() {
        let mut request = request_with(CompositionConfig::default());
        request.subtitles = Some(PathBuf::from("/nonexistent/subs.srt"));
        let blocks = load_subtitles(&request, Canvas::new(1080, 1920), 12.0);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_unparseable_subtitles_degrade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.srt");
        std::fs::write(&path, "1\nnot a timing line\ntext\n").unwrap();

        let mut request = request_with(CompositionConfig::default());
        request.subtitles = Some(path);
        let blocks = load_subtitles(&request, Canvas::new(1080, 1920), 12.0);
        assert!(blocks.is_empty());
    }
}
