//! Download-with-progress.
//!
//! `routine` is the transfer itself (fetch, chunked read, progress, save),
//! `state` the per-surface `DownloadOperation` state machine and `manager`
//! the glue that runs one transfer at a time on a worker thread.

mod fetch;
mod filename;
mod manager;
mod routine;
mod save;
mod state;

pub use fetch::*;
pub use filename::sanitize_filename;
pub use manager::DownloadManager;
pub use routine::*;
pub use save::*;
pub use state::*;

#[cfg(test)]
mod tests;
