use super::loader::Loader;
use super::*;
use crate::catalog::{Track, TrackId};
use crate::download::{FetchError, FetchResponse, Fetcher};
use crate::playback::{DiscardPlays, PlaybackController};
use std::cell::RefCell;
use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn t(id: &str) -> Track {
    Track {
        id: TrackId::new(id),
        title: format!("Title {id}"),
        artist: format!("Artist {id}"),
        media_url: Some(format!("https://cdn.example.com/{id}.mp3")),
        image_url: None,
        duration_label: None,
        release_date: None,
        play_count: 0,
        genres: Vec::new(),
    }
}

#[derive(Default)]
struct RecordingMedia(RefCell<Vec<String>>);

impl RecordingMedia {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl MediaElement for RecordingMedia {
    fn load(&self, url: &str) {
        self.0.borrow_mut().push(format!("load {url}"));
    }
    fn play(&self) {
        self.0.borrow_mut().push("play".into());
    }
    fn pause(&self) {
        self.0.borrow_mut().push("pause".into());
    }
    fn stop(&self) {
        self.0.borrow_mut().push("stop".into());
    }
}

fn controller() -> PlaybackController {
    PlaybackController::new(Box::new(DiscardPlays))
}

#[test]
fn idle_controller_sends_nothing() {
    let c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    binding.sync(&c, &media);
    assert!(media.take().is_empty());
}

#[test]
fn selecting_a_track_loads_then_plays_once() {
    let queue = vec![t("A"), t("B")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    assert_eq!(
        media.take(),
        vec!["load https://cdn.example.com/A.mp3".to_string(), "play".into()]
    );

    // Nothing changed, nothing re-sent.
    binding.sync(&c, &media);
    assert!(media.take().is_empty());
}

#[test]
fn toggling_maps_to_pause_and_play() {
    let queue = vec![t("A")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    media.take();

    c.toggle_play_pause().unwrap();
    binding.sync(&c, &media);
    assert_eq!(media.take(), vec!["pause".to_string()]);

    c.toggle_play_pause().unwrap();
    binding.sync(&c, &media);
    assert_eq!(media.take(), vec!["play".to_string()]);
}

#[test]
fn changing_track_reloads() {
    let queue = vec![t("A"), t("B")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    media.take();

    c.next().unwrap();
    binding.sync(&c, &media);
    assert_eq!(
        media.take(),
        vec!["load https://cdn.example.com/B.mp3".to_string(), "play".into()]
    );
}

#[test]
fn single_track_queue_restarts_after_end() {
    let queue = vec![t("A")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    media.take();

    assert!(binding.media_ended("https://cdn.example.com/A.mp3", &c));
    c.on_track_ended().unwrap();
    binding.sync(&c, &media);
    assert_eq!(
        media.take(),
        vec!["load https://cdn.example.com/A.mp3".to_string(), "play".into()]
    );
}

#[test]
fn reset_stops_loaded_media() {
    let queue = vec![t("A")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    media.take();

    c.reset();
    binding.sync(&c, &media);
    assert_eq!(media.take(), vec!["stop".to_string()]);

    binding.sync(&c, &media);
    assert!(media.take().is_empty());
}

#[test]
fn media_info_defaults_to_full_volume_and_idle() {
    let info = MediaInfo::default();
    assert_eq!(info.volume, 1.0);
    assert!(!info.playing);
    assert!(info.ended.is_none());
    assert!(info.url.is_none());
}

#[test]
fn end_of_a_replaced_track_does_not_advance() {
    let queue = vec![t("A"), t("B"), t("C")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    c.select_and_play(&queue[1], &queue).unwrap();
    binding.sync(&c, &media);
    media.take();

    // A's end arrives after B was loaded.
    assert!(!binding.media_ended("https://cdn.example.com/A.mp3", &c));
    binding.sync(&c, &media);
    assert!(media.take().is_empty());
    assert_eq!(c.current_id(), Some(&TrackId::new("B")));
}

#[test]
fn end_reported_before_binding_caught_up_is_ignored() {
    let queue = vec![t("A"), t("B"), t("C")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);

    // The user picked B, but the binding has not synced yet when A ends.
    c.select_and_play(&queue[1], &queue).unwrap();
    assert!(!binding.media_ended("https://cdn.example.com/A.mp3", &c));
    assert_eq!(c.current_id(), Some(&TrackId::new("B")));
}

#[test]
fn end_of_the_current_track_advances() {
    let queue = vec![t("A"), t("B")];
    let mut c = controller();
    let media = RecordingMedia::default();
    let mut binding = MediaBinding::new();

    c.select_and_play(&queue[0], &queue).unwrap();
    binding.sync(&c, &media);
    media.take();

    assert!(binding.media_ended("https://cdn.example.com/A.mp3", &c));
    c.on_track_ended().unwrap();
    binding.sync(&c, &media);
    assert_eq!(
        media.take(),
        vec!["load https://cdn.example.com/B.mp3".to_string(), "play".into()]
    );
}

/// Serves each URL only once the test releases it.
struct GatedFetcher {
    gates: Mutex<Vec<(String, Receiver<()>)>>,
}

impl GatedFetcher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            gates: Mutex::new(Vec::new()),
        })
    }

    fn gate(&self, url: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().push((url.to_string(), rx));
        tx
    }
}

impl Fetcher for GatedFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let gate = {
            let mut gates = self.gates.lock().unwrap();
            let at = gates.iter().position(|(u, _)| u == url);
            at.map(|i| gates.remove(i).1)
        };
        if let Some(rx) = gate {
            // A dropped sender also releases the fetch.
            let _ = rx.recv_timeout(Duration::from_secs(10));
        }
        Ok(FetchResponse {
            status: 200,
            content_length: Some(url.len() as u64),
            body: Box::new(Cursor::new(url.as_bytes().to_vec())),
        })
    }
}

fn wait_for(loader: &mut Loader) -> Option<(String, Vec<u8>)> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some((url, res)) = loader.poll() {
            return Some((url, res.unwrap()));
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn loader_start_does_not_wait_for_the_fetch() {
    let fetcher = GatedFetcher::new();
    let release = fetcher.gate("slow");
    let mut loader = Loader::new(fetcher);

    let started = Instant::now();
    loader.start("slow");
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(loader.is_pending());
    assert!(loader.poll().is_none());

    release.send(()).unwrap();
    let (url, bytes) = wait_for(&mut loader).expect("fetch finishes");
    assert_eq!(url, "slow");
    assert_eq!(bytes, b"slow");
    assert!(!loader.is_pending());
}

#[test]
fn newer_load_replaces_one_still_in_flight() {
    let fetcher = GatedFetcher::new();
    let release_first = fetcher.gate("first");
    let mut loader = Loader::new(fetcher);

    loader.start("first");
    loader.start("second");
    let (url, _) = wait_for(&mut loader).expect("second finishes");
    assert_eq!(url, "second");

    // The first one completing later is discarded.
    release_first.send(()).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert!(loader.poll().is_none());
}

#[test]
fn cancelled_load_is_discarded() {
    let fetcher = GatedFetcher::new();
    let release = fetcher.gate("gone");
    let mut loader = Loader::new(fetcher);

    loader.start("gone");
    loader.cancel();
    assert!(!loader.is_pending());
    release.send(()).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert!(loader.poll().is_none());
}

#[test]
fn quit_returns_while_a_load_is_still_fetching() {
    let fetcher = GatedFetcher::new();
    let _held = fetcher.gate("https://cdn.example.com/stuck.mp3");
    let player = MediaPlayer::new(fetcher, 1.0);

    player.load("https://cdn.example.com/stuck.mp3");
    player.play();
    std::thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    player.quit_softly(0);
    assert!(started.elapsed() < Duration::from_secs(2));
}
