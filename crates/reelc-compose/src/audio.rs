//! Audio mix planning: narration, optional original sound, background
//! music.
//!
//! Background music is a best-effort lane: when its source is missing or
//! unreadable the failure is logged and the plan simply omits the track.

use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{error, info, warn};

use reelc_media::probe_audio_duration;
use reelc_models::audio::{AudioMixPlan, AudioTrack};
use reelc_models::modes::BgmKind;

/// Pick the background-music source for a run; `None` means no track.
pub fn resolve_bgm(
    kind: BgmKind,
    file: Option<&Path>,
    songs_dir: Option<&Path>,
) -> Option<PathBuf> {
    resolve_bgm_with_rng(kind, file, songs_dir, &mut rand::rng())
}

/// Resolve with an injected RNG for deterministic random selection.
pub fn resolve_bgm_with_rng<R: Rng + ?Sized>(
    kind: BgmKind,
    file: Option<&Path>,
    songs_dir: Option<&Path>,
    rng: &mut R,
) -> Option<PathBuf> {
    match kind {
        BgmKind::None => None,
        BgmKind::File => {
            let path = file?;
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                warn!(path = %path.display(), "configured bgm file missing, skipping background music");
                None
            }
        }
        BgmKind::Random => {
            let Some(dir) = songs_dir else {
                warn!("random bgm requested but no songs directory configured");
                return None;
            };
            let songs = list_songs(dir);
            if songs.is_empty() {
                warn!(dir = %dir.display(), "no songs found, skipping background music");
                return None;
            }
            songs.choose(rng).cloned()
        }
    }
}

fn list_songs(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read songs directory");
            return Vec::new();
        }
    };

    let mut songs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("mp3"))
                .unwrap_or(false)
        })
        .collect();
    songs.sort();
    songs
}

/// Build the final mix, time-aligned to `duration` seconds of video.
///
/// Narration is always the first lane. The original on-camera lane is
/// included only when requested. A background source that fails to probe
/// is dropped from the plan; the run continues without it.
pub async fn plan_mix(
    narration: &Path,
    voice_volume: f64,
    original_volume: Option<f64>,
    bgm: Option<&Path>,
    bgm_volume: f64,
    duration: f64,
) -> AudioMixPlan {
    let mut tracks = vec![AudioTrack::narration(narration.to_path_buf(), voice_volume)];

    if let Some(volume) = original_volume {
        tracks.push(AudioTrack::original(volume));
    }

    if let Some(path) = bgm {
        match probe_audio_duration(path).await {
            Ok(song_secs) => {
                info!(
                    path = %path.display(),
                    song_secs = song_secs,
                    "adding background music"
                );
                tracks.push(AudioTrack::background(
                    path.to_path_buf(),
                    bgm_volume,
                    duration,
                ));
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "failed to add background music, continuing without it"
                );
            }
        }
    }

    AudioMixPlan { tracks, duration }
}
