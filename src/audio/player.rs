use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::warn;

use crate::download::Fetcher;

use super::binding::MediaElement;
use super::thread::spawn_media_thread;
use super::types::{MediaCmd, MediaHandle, MediaInfo};

pub struct MediaPlayer {
    tx: Sender<MediaCmd>,
    info: MediaHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl MediaPlayer {
    /// Spawn the audio thread. Media bytes are fetched through `fetcher`.
    pub fn new(fetcher: Arc<dyn Fetcher>, initial_volume: f32) -> Self {
        let (tx, rx) = mpsc::channel();
        let info = Arc::new(Mutex::new(MediaInfo {
            volume: initial_volume.clamp(0.0, 1.0),
            ..MediaInfo::default()
        }));
        let join = spawn_media_thread(fetcher, rx, info.clone(), initial_volume);

        Self {
            tx,
            info,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn send(&self, cmd: MediaCmd) {
        if let Err(e) = self.tx.send(cmd) {
            warn!("audio thread is gone, dropping {:?}", e.0);
        }
    }

    /// Snapshot of the current playback info.
    pub fn info(&self) -> MediaInfo {
        self.info
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    /// The URL of a track that reached its natural end, reported once.
    pub fn take_ended(&self) -> Option<String> {
        self.info.lock().ok().and_then(|mut info| info.ended.take())
    }

    /// Fade out and stop the audio thread, waiting for it to exit.
    pub fn quit_softly(&self, fade_out_ms: u64) {
        self.send(MediaCmd::Quit { fade_out_ms });
        let join = self.join.lock().ok().and_then(|mut j| j.take());
        if let Some(handle) = join
            && handle.join().is_err()
        {
            warn!("audio thread panicked");
        }
    }
}

impl MediaElement for MediaPlayer {
    fn load(&self, url: &str) {
        self.send(MediaCmd::Load {
            url: url.to_string(),
        });
    }

    fn play(&self) {
        self.send(MediaCmd::Play);
    }

    fn pause(&self) {
        self.send(MediaCmd::Pause);
    }

    fn stop(&self) {
        self.send(MediaCmd::Stop);
    }
}
