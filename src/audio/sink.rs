//! Utilities for creating `rodio` sinks from fetched payloads.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::MediaError;

/// Decode `bytes` into a paused `Sink` on `stream`, returning it with the
/// total duration when known.
pub(super) fn create_sink(
    stream: &OutputStream,
    bytes: Vec<u8>,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| MediaError::Decode(e.to_string()))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

/// Ramp `sink` down to silence over `fade_out_ms`.
pub(super) fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        std::thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
