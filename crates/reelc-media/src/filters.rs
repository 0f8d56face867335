//! FFmpeg filter-string builders for the composition graph.

use std::path::PathBuf;

use reelc_models::audio::{AudioSource, AudioTrack};
use reelc_models::encoding::OUTPUT_FPS;
use reelc_models::subtitle::SubtitleBlock;

/// Escape a value for use inside a quoted filter argument.
pub fn escape_filter_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// Visual styling for subtitle overlays, fixed per run.
#[derive(Debug, Clone)]
pub struct SubtitleStyle {
    pub font_file: PathBuf,
    pub font_size: u32,
    pub fore_color: String,
    /// Text box fill; `None` renders without a box.
    pub background_color: Option<String>,
    pub stroke_color: String,
    pub stroke_width: f64,
}

/// Per-stream video lane: canvas fit plus output-rate normalization.
pub fn video_lane(fit_filter: &str) -> String {
    format!("{},fps={},setsar=1", fit_filter, OUTPUT_FPS)
}

/// A silent stereo lane covering `duration` seconds.
pub fn silent_audio_lane(duration: f64) -> String {
    format!(
        "aevalsrc=0:channel_layout=stereo:sample_rate=44100:d={:.3}",
        duration
    )
}

/// Uniform sample format so concat/amix lanes agree.
pub fn audio_normalize_lane() -> &'static str {
    "aformat=sample_rates=44100:channel_layouts=stereo"
}

/// N-way concat of video (and optionally audio) lanes.
pub fn concat_filter(inputs: usize, with_audio: bool) -> String {
    format!(
        "concat=n={}:v=1:a={}",
        inputs,
        if with_audio { 1 } else { 0 }
    )
}

/// Additive N-way mix, narration lane first; no loudness normalization.
pub fn amix_filter(inputs: usize) -> String {
    format!(
        "amix=inputs={}:duration=first:dropout_transition=0:normalize=0",
        inputs
    )
}

/// The processing chain for one audio lane: loop window, volume, tail fade.
pub fn audio_track_chain(track: &AudioTrack) -> String {
    let mut parts = Vec::new();

    if let Some(window) = track.loop_to {
        parts.push(format!("atrim=0:{:.3}", window));
    }
    parts.push(format!("volume={:.3}", track.volume));
    if let Some(fade) = track.fade_out {
        let window = track.loop_to.unwrap_or(fade);
        let fade_start = (window - fade).max(0.0);
        parts.push(format!("afade=t=out:st={:.3}:d={:.3}", fade_start, fade));
    }

    parts.join(",")
}

/// Whether a track must be fed through a looping input (`-stream_loop -1`).
pub fn needs_input_loop(track: &AudioTrack) -> bool {
    track.loop_to.is_some() && matches!(track.source, AudioSource::File(_))
}

/// One `drawtext` overlay for a positioned subtitle block.
///
/// The block's lines are joined with literal newlines; drawtext honors
/// them as line breaks. Horizontal centering is delegated to the filter
/// (`x=(w-text_w)/2`), the vertical offset comes from the layout engine.
pub fn drawtext_filter(block: &SubtitleBlock, style: &SubtitleStyle) -> String {
    let mut filter = format!(
        "drawtext=fontfile='{}':text='{}':fontsize={}:fontcolor={}",
        escape_filter_text(&style.font_file.to_string_lossy()),
        escape_filter_text(&block.text()),
        style.font_size,
        style.fore_color,
    );

    if let Some(bg) = &style.background_color {
        filter.push_str(&format!(":box=1:boxcolor={}", bg));
    }
    if style.stroke_width > 0.0 {
        filter.push_str(&format!(
            ":borderw={}:bordercolor={}",
            style.stroke_width, style.stroke_color
        ));
    }

    filter.push_str(&format!(
        ":x=(w-text_w)/2:y={:.0}:enable='between(t,{:.3},{:.3})'",
        block.y, block.start, block.end
    ));

    filter
}
