//! The media element: a `rodio`-backed audio thread that plays one remote
//! track at a time, plus `MediaBinding`, which turns playback-controller
//! intent into commands for it.

mod binding;
mod loader;
mod player;
mod sink;
mod thread;
mod types;

pub use binding::*;
pub use player::MediaPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
