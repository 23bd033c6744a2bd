use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::catalog::Track;

use super::fetch::Fetcher;
use super::filename::sanitize_filename;
use super::routine::{DownloadError, download};
use super::save::Saver;
use super::state::{DownloadEvent, DownloadOperation};

/// Runs at most one download at a time on a worker thread and folds its
/// events into the `DownloadOperation` the UI renders.
pub struct DownloadManager {
    op: DownloadOperation,
    fetcher: Arc<dyn Fetcher>,
    saver: Arc<dyn Saver>,
    chunk_size: usize,
    tx: Sender<DownloadEvent>,
    rx: Receiver<DownloadEvent>,
    worker: Option<JoinHandle<()>>,
}

impl DownloadManager {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        saver: Arc<dyn Saver>,
        chunk_size: usize,
        reset_after: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<DownloadEvent>();
        Self {
            op: DownloadOperation::new(reset_after),
            fetcher,
            saver,
            chunk_size,
            tx,
            rx,
            worker: None,
        }
    }

    /// Start downloading `track`. Returns the file name it will be saved as.
    pub fn start(&mut self, track: &Track) -> Result<String, DownloadError> {
        let url = track.media_url.clone().ok_or(DownloadError::MissingUrl)?;
        let filename = sanitize_filename(&track.title, &track.artist);
        self.op.begin(&filename)?;
        info!("downloading {} as {filename}", track.display());

        let fetcher = self.fetcher.clone();
        let saver = self.saver.clone();
        let chunk_size = self.chunk_size;
        let tx = self.tx.clone();
        let name = filename.clone();

        self.worker = Some(thread::spawn(move || {
            let progress_tx = tx.clone();
            let result = download(&*fetcher, &*saver, &url, &name, chunk_size, |p| {
                let _ = progress_tx.send(DownloadEvent::Progress(p));
            });
            let event = match result {
                Ok(path) => {
                    info!("saved {}", path.display());
                    DownloadEvent::Completed(path)
                }
                Err(e) => {
                    warn!("download of {name} failed: {e}");
                    DownloadEvent::Failed(e.to_string())
                }
            };
            let _ = tx.send(event);
        }));

        Ok(filename)
    }

    /// Drain worker events and expire finished states.
    pub fn poll(&mut self, now: Instant) {
        while let Ok(event) = self.rx.try_recv() {
            self.op.apply(event, now);
        }
        if self.op.status().is_terminal() {
            if let Some(h) = self.worker.take() {
                let _ = h.join();
            }
        }
        self.op.tick(now);
    }

    pub fn operation(&self) -> &DownloadOperation {
        &self.op
    }
}
