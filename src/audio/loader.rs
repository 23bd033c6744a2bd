use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::debug;

use crate::download::{Fetcher, fetch_payload};

use super::types::MediaError;

const FETCH_CHUNK: usize = 64 * 1024;

type Fetched = (u64, String, Result<Vec<u8>, MediaError>);

/// Fetches media bytes on helper threads so the audio thread keeps
/// answering commands while a track downloads.
///
/// Every `start` bumps a generation counter. Results from older
/// generations are dropped when they arrive, so a newer load (or a
/// `cancel`) replaces whatever was still in flight.
pub(super) struct Loader {
    fetcher: Arc<dyn Fetcher>,
    generation: u64,
    pending: Option<String>,
    tx: Sender<Fetched>,
    rx: Receiver<Fetched>,
}

impl Loader {
    pub(super) fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    /// Begin fetching `url`, superseding any earlier fetch.
    pub(super) fn start(&mut self, url: &str) {
        self.generation += 1;
        self.pending = Some(url.to_string());

        let generation = self.generation;
        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let url = url.to_string();
        thread::spawn(move || {
            debug!("fetching media from {url}");
            let bytes =
                fetch_payload(&*fetcher, &url, FETCH_CHUNK, |_| {}).map_err(MediaError::from);
            // The loader may be gone by now; nothing to report to.
            let _ = tx.send((generation, url, bytes));
        });
    }

    /// Drop the in-flight fetch, if any.
    pub(super) fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
        }
    }

    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The result of the current fetch once it has arrived.
    pub(super) fn poll(&mut self) -> Option<(String, Result<Vec<u8>, MediaError>)> {
        loop {
            match self.rx.try_recv() {
                Ok((generation, url, result)) if generation == self.generation => {
                    self.pending = None;
                    return Some((url, result));
                }
                Ok((_, url, _)) => debug!("discarding superseded fetch of {url}"),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }
}
