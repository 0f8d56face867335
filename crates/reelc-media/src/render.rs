//! Render driver: the encode boundary.
//!
//! Consumes a validated, fully-built composition model (ordered
//! canvas-normalized segments, an audio mix plan, positioned subtitle
//! overlays) and drives FFmpeg. It is only invoked once the model is
//! complete; a failure here is a codec-level error.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use reelc_models::audio::{AudioMixPlan, AudioSource};
use reelc_models::encoding::{EncodingConfig, OUTPUT_FPS};
use reelc_models::subtitle::SubtitleBlock;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{self, SubtitleStyle};

/// One canvas-normalized timeline entry, ready to encode.
#[derive(Debug, Clone)]
pub struct RenderSegment {
    pub path: PathBuf,
    /// In-point within the source, seconds; ignored for still images.
    pub start: f64,
    /// Entry duration on the timeline, seconds.
    pub duration: f64,
    /// Scale/pad chain that makes the frame exactly canvas-sized.
    pub fit_filter: String,
    /// Retain this segment's native audio in the combined video.
    pub keep_audio: bool,
    /// Whether the source carries an audio stream at all.
    pub has_audio: bool,
    /// Still-image source, looped for `duration`.
    pub is_image: bool,
}

/// Reserve the combined-intermediate path in the same directory as the
/// final output. The returned guard deletes the file on drop, so the
/// intermediate is released on every exit path.
pub fn combined_temp_path(output: &Path) -> MediaResult<tempfile::TempPath> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file = tempfile::Builder::new()
        .prefix("combined-")
        .suffix(".mp4")
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

/// Concatenate the timeline into one canvas-sized intermediate video.
///
/// Every lane is normalized to the canvas and [`OUTPUT_FPS`] before the
/// concat. When any segment retains native audio the graph carries an
/// audio lane per segment, with silence standing in for muted ones.
pub async fn concat_segments(
    segments: &[RenderSegment],
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    if segments.is_empty() {
        return Err(MediaError::internal("concat invoked with an empty timeline"));
    }

    let with_audio = segments.iter().any(|s| s.keep_audio && s.has_audio);

    let mut cmd = FfmpegCommand::new(output);
    for seg in segments {
        cmd = cmd.input(&seg.path);
        if seg.is_image {
            cmd = cmd.image_loop().duration(seg.duration);
        } else {
            cmd = cmd.seek(seg.start).duration(seg.duration);
        }
    }

    cmd = cmd
        .filter_complex(build_concat_filter(segments, with_audio))
        .map("[vout]");
    if with_audio {
        cmd = cmd
            .map("[aout]")
            .audio_codec(&encoding.audio_codec)
            .audio_bitrate(&encoding.audio_bitrate);
    }
    cmd = cmd
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .crf(encoding.crf)
        .fps(OUTPUT_FPS)
        .threads(encoding.threads);

    let total_ms = (segments.iter().map(|s| s.duration).sum::<f64>() * 1000.0) as i64;
    info!(
        segments = segments.len(),
        with_audio,
        output = %output.display(),
        "concatenating timeline"
    );

    FfmpegRunner::new()
        .run_with_progress(&cmd, move |p| {
            debug!(percent = p.percentage(total_ms), frame = p.frame, "concat progress");
        })
        .await?;

    info!(output = %output.display(), "timeline concatenated");
    Ok(())
}

/// Mux the combined video with the audio mix and subtitle overlays into
/// the final container.
pub async fn render_final(
    combined: &Path,
    plan: &AudioMixPlan,
    subtitles: &[SubtitleBlock],
    style: &SubtitleStyle,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let mut cmd = FfmpegCommand::new(output).input(combined);

    // File-backed audio lanes become ffmpeg inputs 1..; the original
    // on-camera lane reads from the combined video itself.
    let mut sources = Vec::with_capacity(plan.tracks.len());
    let mut next_input = 1usize;
    for track in &plan.tracks {
        match &track.source {
            AudioSource::File(path) => {
                cmd = cmd.input(path);
                if filters::needs_input_loop(track) {
                    cmd = cmd.stream_loop(-1);
                }
                sources.push(format!("{}:a", next_input));
                next_input += 1;
            }
            AudioSource::VideoStream => sources.push("0:a".to_string()),
        }
    }

    let (filter, video_map, audio_map) = build_final_graph(plan, &sources, subtitles, style);
    if let Some(filter) = filter {
        cmd = cmd.filter_complex(filter);
    }
    cmd = cmd.map(video_map);
    if let Some(audio_map) = audio_map {
        cmd = cmd
            .map(audio_map)
            .audio_codec(&encoding.audio_codec)
            .audio_bitrate(&encoding.audio_bitrate);
    }
    cmd = cmd
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .crf(encoding.crf)
        .fps(OUTPUT_FPS)
        .threads(encoding.threads);

    let total_ms = (plan.duration * 1000.0) as i64;
    info!(
        tracks = plan.tracks.len(),
        overlays = subtitles.len(),
        output = %output.display(),
        "rendering final video"
    );

    FfmpegRunner::new()
        .run_with_progress(&cmd, move |p| {
            debug!(percent = p.percentage(total_ms), speed = p.speed, "render progress");
        })
        .await?;

    info!(output = %output.display(), "render complete");
    Ok(())
}

fn build_concat_filter(segments: &[RenderSegment], with_audio: bool) -> String {
    let mut parts = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        parts.push(format!(
            "[{i}:v]{}[v{i}]",
            filters::video_lane(&seg.fit_filter)
        ));
        if with_audio {
            if seg.keep_audio && seg.has_audio {
                parts.push(format!("[{i}:a]{}[a{i}]", filters::audio_normalize_lane()));
            } else {
                parts.push(format!(
                    "{}[a{i}]",
                    filters::silent_audio_lane(seg.duration)
                ));
            }
        }
    }

    let mut lanes = String::new();
    for i in 0..segments.len() {
        lanes.push_str(&format!("[v{i}]"));
        if with_audio {
            lanes.push_str(&format!("[a{i}]"));
        }
    }
    let mut tail = format!(
        "{lanes}{}[vout]",
        filters::concat_filter(segments.len(), with_audio)
    );
    if with_audio {
        tail.push_str("[aout]");
    }
    parts.push(tail);

    parts.join(";")
}

fn build_final_graph(
    plan: &AudioMixPlan,
    sources: &[String],
    subtitles: &[SubtitleBlock],
    style: &SubtitleStyle,
) -> (Option<String>, String, Option<String>) {
    let mut parts = Vec::new();

    let video_map = if subtitles.is_empty() {
        "0:v".to_string()
    } else {
        let chain = subtitles
            .iter()
            .map(|b| filters::drawtext_filter(b, style))
            .collect::<Vec<_>>()
            .join(",");
        parts.push(format!("[0:v]{chain}[vout]"));
        "[vout]".to_string()
    };

    let audio_map = if plan.tracks.is_empty() {
        None
    } else {
        for (k, (track, src)) in plan.tracks.iter().zip(sources.iter()).enumerate() {
            parts.push(format!(
                "[{src}]{}[mix{k}]",
                filters::audio_track_chain(track)
            ));
        }
        if plan.tracks.len() == 1 {
            Some("[mix0]".to_string())
        } else {
            let lanes: String = (0..plan.tracks.len()).map(|k| format!("[mix{k}]")).collect();
            parts.push(format!(
                "{lanes}{}[aout]",
                filters::amix_filter(plan.tracks.len())
            ));
            Some("[aout]".to_string())
        }
    };

    let filter = (!parts.is_empty()).then(|| parts.join(";"));
    (filter, video_map, audio_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelc_models::audio::AudioTrack;

    fn video_segment(start: f64, duration: f64) -> RenderSegment {
        RenderSegment {
            path: PathBuf::from("clip.mp4"),
            start,
            duration,
            fit_filter: "scale=1080:1920".to_string(),
            keep_audio: false,
            has_audio: true,
            is_image: false,
        }
    }

    fn style() -> SubtitleStyle {
        SubtitleStyle {
            font_file: PathBuf::from("/fonts/demo.ttc"),
            font_size: 60,
            fore_color: "#FFFFFF".into(),
            background_color: None,
            stroke_color: "#000000".into(),
            stroke_width: 1.5,
        }
    }

    #[test]
    fn test_concat_filter_video_only() {
        let segments = vec![video_segment(0.0, 5.0), video_segment(5.0, 2.0)];
        let filter = build_concat_filter(&segments, false);
        assert!(filter.contains("[0:v]scale=1080:1920,fps=30,setsar=1[v0]"));
        assert!(filter.contains("[v0][v1]concat=n=2:v=1:a=0[vout]"));
        assert!(!filter.contains("[a0]"));
    }

    #[test]
    fn test_concat_filter_with_retained_audio() {
        let mut muted = video_segment(0.0, 5.0);
        let mut voiced = video_segment(0.0, 3.0);
        voiced.keep_audio = true;
        muted.keep_audio = false;
        let filter = build_concat_filter(&[voiced, muted], true);
        assert!(filter.contains("[0:a]aformat="));
        assert!(filter.contains("aevalsrc=0"));
        assert!(filter.contains("concat=n=2:v=1:a=1[vout][aout]"));
    }

    #[test]
    fn test_final_graph_narration_only() {
        let plan = AudioMixPlan {
            tracks: vec![AudioTrack::narration(PathBuf::from("voice.mp3"), 1.0)],
            duration: 12.0,
        };
        let sources = vec!["1:a".to_string()];
        let (filter, video_map, audio_map) = build_final_graph(&plan, &sources, &[], &style());
        assert_eq!(video_map, "0:v");
        assert_eq!(audio_map.as_deref(), Some("[mix0]"));
        assert_eq!(filter.as_deref(), Some("[1:a]volume=1.000[mix0]"));
    }

    #[test]
    fn test_final_graph_full_mix_with_subtitles() {
        let plan = AudioMixPlan {
            tracks: vec![
                AudioTrack::narration(PathBuf::from("voice.mp3"), 1.0),
                AudioTrack::original(1.0),
                AudioTrack::background(PathBuf::from("song.mp3"), 0.2, 12.0),
            ],
            duration: 12.0,
        };
        let sources = vec!["1:a".to_string(), "0:a".to_string(), "2:a".to_string()];
        let subtitles = vec![SubtitleBlock {
            lines: vec!["hello".into()],
            height: 70.0,
            y: 1754.0,
            start: 0.0,
            end: 2.0,
        }];
        let (filter, video_map, audio_map) =
            build_final_graph(&plan, &sources, &subtitles, &style());
        let filter = filter.unwrap();
        assert_eq!(video_map, "[vout]");
        assert_eq!(audio_map.as_deref(), Some("[aout]"));
        assert!(filter.contains("[0:v]drawtext="));
        assert!(filter.contains("[0:a]volume=1.000[mix1]"));
        assert!(filter.contains("[2:a]atrim=0:12.000"));
        assert!(filter.contains("[mix0][mix1][mix2]amix=inputs=3"));
    }

    #[test]
    fn test_temp_path_lands_next_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.mp4");
        let tmp = combined_temp_path(&output).unwrap();
        assert_eq!(tmp.parent().unwrap(), dir.path());
        let name = tmp.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("combined-") && name.ends_with(".mp4"));
    }
}
