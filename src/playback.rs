//! Playback queue controller and the detached play-count recorder.
//!
//! The controller only decides *which* track is current and whether it
//! should be audible; actually producing sound is the media element's job
//! (see `audio`).

mod controller;
mod recorder;

pub use controller::*;
pub use recorder::*;
