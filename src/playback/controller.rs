//! Playback state: `PlaybackController` and `PlaybackState`.

use log::debug;

use crate::catalog::{Track, TrackId};

use super::recorder::PlayCountRecorder;

/// The playback state derived from the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Why an operation left the controller untouched.
///
/// These are never user-visible; callers log and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackNoOp {
    /// The selected track has no media URL.
    NotPlayable(TrackId),
    /// Nothing is selected.
    NoCurrentTrack,
    /// The active queue is empty.
    EmptyQueue,
    /// The current track is not part of the active queue.
    NotInQueue(TrackId),
}

pub type PlaybackResult = Result<(), PlaybackNoOp>;

/// Current-track and play/pause intent over a caller-supplied queue.
pub struct PlaybackController {
    queue: Vec<Track>,
    current: Option<TrackId>,
    playing: bool,
    recorder: Box<dyn PlayCountRecorder>,
}

impl PlaybackController {
    pub fn new(recorder: Box<dyn PlayCountRecorder>) -> Self {
        Self {
            queue: Vec::new(),
            current: None,
            playing: false,
            recorder,
        }
    }

    /// Make `track` current and audible, remembering `queue` for next/previous.
    ///
    /// The play-count increment is handed off and never awaited.
    pub fn select_and_play(&mut self, track: &Track, queue: &[Track]) -> PlaybackResult {
        if !track.can_play() {
            return Err(PlaybackNoOp::NotPlayable(track.id.clone()));
        }

        self.queue = queue.to_vec();
        self.current = Some(track.id.clone());
        self.playing = true;
        debug!("playing {} ({})", track.display(), track.id);

        self.recorder.record_play(&track.id);
        Ok(())
    }

    /// Toggle if `track` is already current, otherwise select it.
    pub fn play_or_toggle(&mut self, track: &Track, queue: &[Track]) -> PlaybackResult {
        if self.current.as_ref() == Some(&track.id) {
            self.toggle_play_pause()
        } else {
            self.select_and_play(track, queue)
        }
    }

    pub fn toggle_play_pause(&mut self) -> PlaybackResult {
        if self.current.is_none() {
            return Err(PlaybackNoOp::NoCurrentTrack);
        }
        self.playing = !self.playing;
        Ok(())
    }

    pub fn play(&mut self) -> PlaybackResult {
        if self.playing {
            return Ok(());
        }
        self.toggle_play_pause()
    }

    pub fn pause(&mut self) -> PlaybackResult {
        if !self.playing {
            return Ok(());
        }
        self.toggle_play_pause()
    }

    /// Advance to the following track, wrapping to the start.
    pub fn next(&mut self) -> PlaybackResult {
        self.step(|pos, len| (pos + 1) % len)
    }

    /// Go back one track, wrapping to the end.
    pub fn previous(&mut self) -> PlaybackResult {
        self.step(|pos, len| (pos + len - 1) % len)
    }

    /// The media element reached the end of the current track.
    pub fn on_track_ended(&mut self) -> PlaybackResult {
        self.next()
    }

    /// Forget everything (the page showing the player went away).
    pub fn reset(&mut self) {
        self.queue.clear();
        self.current = None;
        self.playing = false;
    }

    fn step(&mut self, advance: impl Fn(usize, usize) -> usize) -> PlaybackResult {
        if self.queue.is_empty() {
            return Err(PlaybackNoOp::EmptyQueue);
        }
        let Some(current) = self.current.as_ref() else {
            return Err(PlaybackNoOp::NoCurrentTrack);
        };
        let Some(pos) = self.queue.iter().position(|t| &t.id == current) else {
            return Err(PlaybackNoOp::NotInQueue(current.clone()));
        };

        let target = &self.queue[advance(pos, self.queue.len())];
        self.current = Some(target.id.clone());
        self.playing = true;
        Ok(())
    }

    pub fn current_track(&self) -> Option<&Track> {
        let current = self.current.as_ref()?;
        self.queue.iter().find(|t| &t.id == current)
    }

    pub fn current_id(&self) -> Option<&TrackId> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn state(&self) -> PlaybackState {
        match (self.current.is_some(), self.playing) {
            (false, _) => PlaybackState::Stopped,
            (true, true) => PlaybackState::Playing,
            (true, false) => PlaybackState::Paused,
        }
    }
}
