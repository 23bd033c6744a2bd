//! Fire-and-forget play-count increments.
//!
//! Increments run on a dedicated worker thread fed through a channel, so a
//! slow or failing catalog never holds up a playback transition. Failures
//! are logged there and go nowhere else.

use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::catalog::{Catalog, TrackId};

/// Where the controller reports "this track was selected for playback".
pub trait PlayCountRecorder {
    fn record_play(&self, id: &TrackId);
}

/// Recorder used when no catalog is reachable.
pub struct DiscardPlays;

impl PlayCountRecorder for DiscardPlays {
    fn record_play(&self, id: &TrackId) {
        debug!("not recording play of {id}: no catalog");
    }
}

enum PlayCountMsg {
    Record(TrackId),
    Shutdown,
}

/// Background worker issuing play-count increments against a `Catalog`.
pub struct PlayCountWorker {
    tx: Sender<PlayCountMsg>,
    join: Option<JoinHandle<()>>,
}

impl PlayCountWorker {
    pub fn spawn(catalog: Arc<dyn Catalog>) -> Self {
        let (tx, rx) = mpsc::channel::<PlayCountMsg>();

        let join = thread::spawn(move || {
            for msg in rx {
                match msg {
                    PlayCountMsg::Record(id) => {
                        if let Err(e) = catalog.increment_play_count(&id) {
                            warn!("play count increment for {id} failed: {e}");
                        }
                    }
                    PlayCountMsg::Shutdown => break,
                }
            }
        });

        Self {
            tx,
            join: Some(join),
        }
    }

    /// A cheap handle the controller can own.
    pub fn recorder(&self) -> ChannelRecorder {
        ChannelRecorder {
            tx: self.tx.clone(),
        }
    }

    /// Finish the increments already queued, then stop the worker.
    pub fn shutdown(mut self) {
        let _ = self.tx.send(PlayCountMsg::Shutdown);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

pub struct ChannelRecorder {
    tx: Sender<PlayCountMsg>,
}

impl PlayCountRecorder for ChannelRecorder {
    fn record_play(&self, id: &TrackId) {
        if self.tx.send(PlayCountMsg::Record(id.clone())).is_err() {
            warn!("play count worker is gone; dropping play of {id}");
        }
    }
}
