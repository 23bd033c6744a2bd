use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::routine::DownloadError;

/// `Idle -> Downloading -> {Completed, Error} -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Idle,
    Downloading,
    Completed,
    Error,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// What a running transfer reports back to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress(f32),
    Completed(PathBuf),
    Failed(String),
}

/// The single download a UI surface shows.
#[derive(Debug, Clone)]
pub struct DownloadOperation {
    status: DownloadStatus,
    progress: Option<f32>,
    filename: String,
    saved_to: Option<PathBuf>,
    error: Option<String>,
    finished_at: Option<Instant>,
    reset_after: Duration,
}

impl DownloadOperation {
    /// `reset_after` is how long a finished state stays visible.
    pub fn new(reset_after: Duration) -> Self {
        Self {
            status: DownloadStatus::Idle,
            progress: None,
            filename: String::new(),
            saved_to: None,
            error: None,
            finished_at: None,
            reset_after,
        }
    }

    /// Enter `Downloading`. Refused while another transfer is in flight.
    pub fn begin(&mut self, filename: &str) -> Result<(), DownloadError> {
        if self.status == DownloadStatus::Downloading {
            return Err(DownloadError::Busy);
        }
        self.status = DownloadStatus::Downloading;
        self.progress = None;
        self.filename = filename.to_string();
        self.saved_to = None;
        self.error = None;
        self.finished_at = None;
        Ok(())
    }

    /// Apply a worker event. Events outside `Downloading` are stale and ignored.
    pub fn apply(&mut self, event: DownloadEvent, now: Instant) {
        if self.status != DownloadStatus::Downloading {
            return;
        }
        match event {
            DownloadEvent::Progress(p) => self.progress = Some(p.clamp(0.0, 1.0)),
            DownloadEvent::Completed(path) => {
                self.status = DownloadStatus::Completed;
                self.progress = Some(1.0);
                self.saved_to = Some(path);
                self.finished_at = Some(now);
            }
            DownloadEvent::Failed(msg) => {
                self.status = DownloadStatus::Error;
                self.error = Some(msg);
                self.finished_at = Some(now);
            }
        }
    }

    /// Drop a finished state back to `Idle` once it has been shown long
    /// enough. Returns true when that happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(done) = self.finished_at else {
            return false;
        };
        if !self.status.is_terminal() || now.saturating_duration_since(done) < self.reset_after {
            return false;
        }
        *self = Self::new(self.reset_after);
        true
    }

    pub fn status(&self) -> DownloadStatus {
        self.status
    }

    /// Fraction in `[0, 1]`; `None` while the total size is unknown.
    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.saved_to.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
