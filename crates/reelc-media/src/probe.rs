//! FFprobe media information and clip handles.
//!
//! A source is resolved to [`MediaKind::Video`] or [`MediaKind::Image`]
//! exactly once, at open time, by inspecting the probed streams; nothing
//! downstream guesses again.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Video-stream codec names that actually denote still images.
const IMAGE_CODECS: &[&str] = &["png", "mjpeg", "bmp", "webp", "tiff", "gif"];

/// What kind of visual source a file turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
}

/// Probed media information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub kind: MediaKind,
    /// Container duration in seconds; zero for still images.
    pub duration: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Source frame rate (fps)
    pub fps: f64,
    /// Whether the file carries an audio stream
    pub has_audio: bool,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

/// Probe a media file for stream information.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();
    let probe = run_ffprobe(path).await?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| {
            MediaError::invalid_media(format!("No video stream in {}", path.display()))
        })?;

    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let codec = video_stream.codec_name.as_deref().unwrap_or_default();
    let single_frame = video_stream.nb_frames.as_deref() == Some("1");
    let kind = if IMAGE_CODECS.contains(&codec) || single_frame {
        MediaKind::Image
    } else {
        MediaKind::Video
    };

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    Ok(MediaInfo {
        kind,
        duration: if kind == MediaKind::Image { 0.0 } else { duration },
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        has_audio,
    })
}

/// Probe an audio file's duration; errors when no audio stream exists.
pub async fn probe_audio_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    let probe = run_ffprobe(path).await?;

    if !probe.streams.iter().any(|s| s.codec_type == "audio") {
        return Err(MediaError::invalid_media(format!(
            "No audio stream in {}",
            path.display()
        )));
    }

    probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0)
        .ok_or_else(|| {
            MediaError::invalid_media(format!("No usable duration in {}", path.display()))
        })
}

async fn run_ffprobe(path: &Path) -> MediaResult<FfprobeOutput> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

/// An opened source clip: path plus probed info.
///
/// Opened once at segmentation time; segments hold it through an `Arc`, so
/// it is released when the last segment derived from it is dropped.
#[derive(Debug, Clone)]
pub struct MediaClip {
    path: PathBuf,
    info: MediaInfo,
}

impl MediaClip {
    /// Open a clip by probing it. Unreadable sources fail here, before any
    /// rendering is attempted.
    pub async fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        let info = probe_media(&path).await?;
        Ok(Self { path, info })
    }

    /// Wrap an already-probed source.
    pub fn from_parts(path: impl Into<PathBuf>, info: MediaInfo) -> Self {
        Self {
            path: path.into(),
            info,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &MediaInfo {
        &self.info
    }

    pub fn kind(&self) -> MediaKind {
        self.info.kind
    }

    pub fn duration(&self) -> f64 {
        self.info.duration
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    pub fn has_audio(&self) -> bool {
        self.info.has_audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("30/0").is_none());
    }

    #[test]
    fn test_image_kind_resolution() {
        let json = r#"{
            "format": {"duration": "0.04"},
            "streams": [
                {"codec_type": "video", "codec_name": "png", "width": 800, "height": 600,
                 "r_frame_rate": "25/1", "avg_frame_rate": "0/0", "nb_frames": "1"}
            ]
        }"#;
        let probe: FfprobeOutput = serde_json::from_str(json).unwrap();
        let stream = &probe.streams[0];
        assert!(IMAGE_CODECS.contains(&stream.codec_name.as_deref().unwrap()));
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let err = probe_media("/nonexistent/clip.mp4").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_probe_audio_missing_file() {
        let err = probe_audio_duration("/nonexistent/voice.mp3").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[test]
    fn test_clip_accessors() {
        let clip = MediaClip::from_parts(
            "demo.mp4",
            MediaInfo {
                kind: MediaKind::Video,
                duration: 20.0,
                width: 1920,
                height: 1080,
                fps: 30.0,
                has_audio: true,
            },
        );
        assert_eq!(clip.frame_size(), (1920, 1080));
        assert!(clip.has_audio());
        assert_eq!(clip.kind(), MediaKind::Video);
    }
}
