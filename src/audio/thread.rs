use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, warn};
use rodio::{OutputStreamBuilder, Sink};

use crate::download::Fetcher;

use super::loader::Loader;
use super::sink::{create_sink, fade_out_sink};
use super::types::{MediaCmd, MediaError, MediaHandle};

const IDLE_TICK: Duration = Duration::from_millis(200);
const LOADING_TICK: Duration = Duration::from_millis(20);

pub(super) fn spawn_media_thread(
    fetcher: Arc<dyn Fetcher>,
    rx: Receiver<MediaCmd>,
    info: MediaHandle,
    initial_volume: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let err = MediaError::NoOutputDevice(e.to_string());
                error!("{err}");
                if let Ok(mut info) = info.lock() {
                    info.error = Some(err.to_string());
                }
                // Drain commands until told to quit.
                while let Ok(cmd) = rx.recv() {
                    if matches!(cmd, MediaCmd::Quit { .. }) {
                        break;
                    }
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which corrupts the TUI.
        stream.log_on_drop(false);

        let mut loader = Loader::new(fetcher);
        let mut sink: Option<Sink> = None;
        let mut paused = true;
        let mut volume = initial_volume.clamp(0.0, 1.0);

        if let Ok(mut info) = info.lock() {
            info.volume = volume;
        }

        fn do_stop(
            sink: &mut Option<Sink>,
            loader: &mut Loader,
            paused: &mut bool,
            info: &MediaHandle,
        ) {
            loader.cancel();
            if let Some(s) = sink.take() {
                s.stop();
            }
            *paused = true;
            if let Ok(mut info) = info.lock() {
                info.url = None;
                info.elapsed = Duration::ZERO;
                info.duration = None;
                info.playing = false;
                info.loading = false;
            }
        }

        loop {
            let tick = if loader.is_pending() {
                LOADING_TICK
            } else {
                IDLE_TICK
            };
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    MediaCmd::Load { url } => {
                        do_stop(&mut sink, &mut loader, &mut paused, &info);
                        if let Ok(mut info) = info.lock() {
                            info.url = Some(url.clone());
                            info.loading = true;
                            info.ended = None;
                            info.error = None;
                        }
                        loader.start(&url);
                    }

                    MediaCmd::Play => {
                        paused = false;
                        if let Some(s) = sink.as_ref() {
                            s.play();
                        }
                        if let Ok(mut info) = info.lock() {
                            info.playing = sink.is_some();
                        }
                    }

                    MediaCmd::Pause => {
                        paused = true;
                        if let Some(s) = sink.as_ref() {
                            s.pause();
                        }
                        if let Ok(mut info) = info.lock() {
                            info.playing = false;
                        }
                    }

                    MediaCmd::SeekBy(secs) => {
                        let Some(s) = sink.as_ref() else {
                            continue;
                        };
                        let cur = s.get_pos().as_secs() as i64;
                        let mut target = Duration::from_secs((cur + secs as i64).max(0) as u64);
                        if let Ok(info) = info.lock()
                            && let Some(total) = info.duration
                        {
                            target = target.min(total);
                        }
                        if let Err(e) = s.try_seek(target) {
                            warn!("seek to {target:?} failed: {e}");
                        }
                    }

                    MediaCmd::SetVolume(v) => {
                        volume = v.clamp(0.0, 1.0);
                        if let Some(s) = sink.as_ref() {
                            s.set_volume(volume);
                        }
                        if let Ok(mut info) = info.lock() {
                            info.volume = volume;
                        }
                    }

                    MediaCmd::Stop => do_stop(&mut sink, &mut loader, &mut paused, &info),

                    MediaCmd::Quit { fade_out_ms } => {
                        loader.cancel();
                        if let Some(s) = sink.as_ref() {
                            if !paused {
                                fade_out_sink(s, fade_out_ms);
                            }
                            s.stop();
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some((url, fetched)) = loader.poll() {
                let mut total = None;
                let mut failure = None;
                match fetched.and_then(|bytes| create_sink(&stream, bytes)) {
                    Ok((s, duration)) => {
                        debug!("loaded {url}");
                        s.set_volume(volume);
                        if !paused {
                            s.play();
                        }
                        sink = Some(s);
                        total = duration;
                    }
                    Err(e) => {
                        warn!("could not load {url}: {e}");
                        failure = Some(e.to_string());
                    }
                }
                if let Ok(mut info) = info.lock() {
                    info.loading = false;
                    info.duration = total;
                    info.playing = sink.is_some() && !paused;
                    info.error = failure;
                }
            }

            // Track position and detect the natural end of the loaded track.
            let finished = match sink.as_ref() {
                Some(s) if !paused && s.empty() => true,
                Some(s) => {
                    if let Ok(mut info) = info.lock() {
                        info.elapsed = s.get_pos();
                    }
                    false
                }
                None => false,
            };
            if finished {
                sink = None;
                paused = true;
                if let Ok(mut info) = info.lock() {
                    info.playing = false;
                    info.ended = info.url.clone();
                    if let Some(total) = info.duration {
                        info.elapsed = total;
                    }
                }
            }
        }
    })
}
