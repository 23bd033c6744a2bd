//! Audio-related small types and handles.
//!
//! This module defines the commands accepted by the audio thread, the
//! playback info it publishes and the errors it can run into.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::download::DownloadError;

#[derive(Debug)]
pub enum MediaCmd {
    /// Fetch and decode `url`, replacing the current track. Starts paused.
    Load { url: String },
    /// Resume/start playback of the loaded track.
    Play,
    /// Pause playback.
    Pause,
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i32),
    /// Set output volume (0.0 - 1.0).
    SetVolume(f32),
    /// Unload the current track.
    Stop,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone)]
/// Runtime playback information shared with the UI.
pub struct MediaInfo {
    /// URL of the loaded track (if any).
    pub url: Option<String>,
    /// Playback position within the loaded track.
    pub elapsed: Duration,
    /// Total length, when the decoder knows it.
    pub duration: Option<Duration>,
    /// Whether audio is currently coming out.
    pub playing: bool,
    /// A `Load` is being fetched/decoded.
    pub loading: bool,
    /// URL of a track that played to its end, until someone consumes it.
    pub ended: Option<String>,
    /// Last load/playback failure.
    pub error: Option<String>,
    pub volume: f32,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            url: None,
            elapsed: Duration::ZERO,
            duration: None,
            playing: false,
            loading: false,
            ended: None,
            error: None,
            volume: 1.0,
        }
    }
}

pub type MediaHandle = Arc<Mutex<MediaInfo>>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not fetch media: {0}")]
    Fetch(#[from] DownloadError),
    #[error("could not decode media: {0}")]
    Decode(String),
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
}
