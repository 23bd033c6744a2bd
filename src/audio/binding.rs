use crate::catalog::TrackId;
use crate::playback::PlaybackController;

/// Something that can play one media URL at a time.
pub trait MediaElement {
    fn load(&self, url: &str);
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
}

/// Mirrors the controller's current track and playing flag onto a
/// [`MediaElement`], issuing each command once per change.
#[derive(Debug, Default)]
pub struct MediaBinding {
    loaded: Option<TrackId>,
    loaded_url: Option<String>,
    playing: bool,
}

impl MediaBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, controller: &PlaybackController, media: &dyn MediaElement) {
        let Some(track) = controller.current_track() else {
            if self.loaded.take().is_some() {
                media.stop();
            }
            self.loaded_url = None;
            self.playing = false;
            return;
        };

        if self.loaded.as_ref() != Some(&track.id) {
            match track.media_url.as_deref() {
                Some(url) => media.load(url),
                None => media.stop(),
            }
            self.loaded = Some(track.id.clone());
            self.loaded_url = track.media_url.clone();
            self.playing = false;
        }

        let want = controller.is_playing();
        if want != self.playing {
            if want {
                media.play();
            } else {
                media.pause();
            }
            self.playing = want;
        }
    }

    /// Handle the element reporting that `url` played to its end.
    ///
    /// Returns `true` when that is the track the controller still has
    /// current, in which case the binding forgets it so the next `sync`
    /// reloads (a queue that wraps onto the same track starts it again).
    /// An end reported for anything else is stale and ignored.
    pub fn media_ended(&mut self, url: &str, controller: &PlaybackController) -> bool {
        let current = controller.current_track().map(|t| &t.id);
        if self.loaded_url.as_deref() != Some(url) || current != self.loaded.as_ref() {
            return false;
        }
        self.loaded = None;
        self.loaded_url = None;
        self.playing = false;
        true
    }
}
