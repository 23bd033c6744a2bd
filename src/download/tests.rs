use super::*;
use crate::catalog::{Track, TrackId};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Body yielding one scripted chunk per `read` call.
struct ChunkedBody {
    chunks: VecDeque<io::Result<Vec<u8>>>,
}

impl Read for ChunkedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.chunks.pop_front() {
            None => Ok(0),
            Some(Err(e)) => Err(e),
            Some(Ok(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.chunks.push_front(Ok(chunk.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

struct FakeFetcher {
    status: u16,
    content_length: Option<u64>,
    chunks: Vec<Vec<u8>>,
    fail_mid_stream: bool,
    unreachable: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn ok(total: usize, chunk: usize) -> Self {
        let chunks = (0..total / chunk).map(|i| vec![i as u8; chunk]).collect();
        Self {
            status: 200,
            content_length: Some(total as u64),
            chunks,
            fail_mid_stream: false,
            unreachable: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.unreachable {
            return Err(FetchError("connection refused".to_string()));
        }
        let mut chunks: VecDeque<io::Result<Vec<u8>>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if self.fail_mid_stream {
            chunks.push_back(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));
        }
        Ok(FetchResponse {
            status: self.status,
            content_length: self.content_length,
            body: Box::new(ChunkedBody { chunks }),
        })
    }
}

#[derive(Default)]
struct MemorySaver {
    fail: bool,
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl Saver for MemorySaver {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(filename))
    }
}

fn track(media_url: Option<&str>) -> Track {
    Track {
        id: TrackId::new("1"),
        title: "Café Night".to_string(),
        artist: "DJ/Spark".to_string(),
        media_url: media_url.map(str::to_string),
        image_url: None,
        duration_label: None,
        release_date: None,
        play_count: 0,
        genres: Vec::new(),
    }
}

#[test]
fn sanitize_replaces_non_alphanumerics_and_lowercases() {
    assert_eq!(
        sanitize_filename("Café Night", "DJ/Spark"),
        "caf__night_by_dj_spark.mp3"
    );
    assert_eq!(
        sanitize_filename("Café Night", "DJ/Spark"),
        sanitize_filename("Café Night", "DJ/Spark")
    );
}

#[test]
fn sanitize_is_total() {
    assert_eq!(sanitize_filename("", ""), "_by_.mp3");
    assert_eq!(sanitize_filename("!!", "??"), "___by___.mp3");
    assert_eq!(sanitize_filename("Ke Nako 2", "MACK"), "ke_nako_2_by_mack.mp3");
}

#[test]
fn progress_is_reported_after_each_chunk() {
    let fetcher = FakeFetcher::ok(1000, 250);
    let saver = MemorySaver::default();
    let mut progress = Vec::new();

    let path = download(&fetcher, &saver, "https://cdn/x.mp3", "x.mp3", 4096, |p| {
        progress.push(p)
    })
    .unwrap();

    assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);
    assert_eq!(path, PathBuf::from("/downloads/x.mp3"));
    let saved = saver.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "x.mp3");
    assert_eq!(saved[0].1.len(), 1000);
    assert_eq!(&saved[0].1[250..500], &[1u8; 250][..]);
}

#[test]
fn small_chunk_size_splits_reads() {
    let fetcher = FakeFetcher::ok(1000, 500);
    let saver = MemorySaver::default();
    let mut progress = Vec::new();

    download(&fetcher, &saver, "https://cdn/x.mp3", "x.mp3", 250, |p| {
        progress.push(p)
    })
    .unwrap();

    assert_eq!(progress, vec![0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn unknown_length_reports_no_progress_but_completes() {
    let mut fetcher = FakeFetcher::ok(1000, 250);
    fetcher.content_length = None;
    let saver = MemorySaver::default();
    let mut progress = Vec::new();

    download(&fetcher, &saver, "https://cdn/x.mp3", "x.mp3", 4096, |p| {
        progress.push(p)
    })
    .unwrap();

    assert!(progress.is_empty());
    assert_eq!(saver.saved.lock().unwrap()[0].1.len(), 1000);
}

#[test]
fn non_success_status_is_an_error_and_nothing_is_saved() {
    let mut fetcher = FakeFetcher::ok(1000, 250);
    fetcher.status = 404;
    let saver = MemorySaver::default();

    let err = download(&fetcher, &saver, "https://cdn/x.mp3", "x.mp3", 4096, |_| {}).unwrap_err();
    assert!(matches!(err, DownloadError::Status(404)));
    assert!(saver.saved.lock().unwrap().is_empty());
}

#[test]
fn network_failures_are_errors_and_nothing_is_saved() {
    let mut unreachable = FakeFetcher::ok(1000, 250);
    unreachable.unreachable = true;
    let mut broken = FakeFetcher::ok(1000, 250);
    broken.fail_mid_stream = true;
    let saver = MemorySaver::default();

    for fetcher in [unreachable, broken] {
        let err = download(&fetcher, &saver, "https://cdn/x.mp3", "x.mp3", 4096, |_| {})
            .unwrap_err();
        assert!(matches!(err, DownloadError::Network(_)));
    }
    assert!(saver.saved.lock().unwrap().is_empty());
}

#[test]
fn empty_url_is_rejected_before_fetching() {
    let fetcher = FakeFetcher::ok(1000, 250);
    let err = fetch_payload(&fetcher, "  ", 4096, |_| {}).unwrap_err();
    assert!(matches!(err, DownloadError::MissingUrl));
    assert!(fetcher.calls.lock().unwrap().is_empty());
}

#[test]
fn save_failure_is_reported() {
    let fetcher = FakeFetcher::ok(1000, 250);
    let saver = MemorySaver {
        fail: true,
        ..MemorySaver::default()
    };
    let err = download(&fetcher, &saver, "https://cdn/x.mp3", "x.mp3", 4096, |_| {}).unwrap_err();
    assert!(matches!(err, DownloadError::Save(_)));
}

#[test]
fn directory_saver_writes_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let saver = DirectorySaver::new(dir.path().join("nested"));
    assert_eq!(saver.dir(), dir.path().join("nested"));

    let path = saver.save("a_by_b.mp3", b"payload").unwrap();
    assert_eq!(path, dir.path().join("nested").join("a_by_b.mp3"));
    assert_eq!(std::fs::read(&path).unwrap(), b"payload");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(leftovers, vec!["a_by_b.mp3".to_string()]);
}

#[test]
fn directory_saver_rejects_paths_and_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let saver = DirectorySaver::new(dir.path());

    assert!(saver.save("../escape.mp3", b"x").is_err());
    assert!(saver.save("", b"x").is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn directory_saver_failure_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory squatting on the target name makes the final rename fail.
    std::fs::create_dir(dir.path().join("x.mp3")).unwrap();
    std::fs::write(dir.path().join("x.mp3").join("keep"), b"k").unwrap();
    let saver = DirectorySaver::new(dir.path());

    assert!(saver.save("x.mp3", b"payload").is_err());
    assert!(!dir.path().join(".x.mp3.part").exists());
}

#[test]
fn operation_follows_the_linear_state_machine() {
    let start = Instant::now();
    let mut op = DownloadOperation::new(Duration::from_secs(3));
    assert_eq!(op.status(), DownloadStatus::Idle);

    op.begin("x.mp3").unwrap();
    assert_eq!(op.status(), DownloadStatus::Downloading);
    assert_eq!(op.progress(), None);

    op.apply(DownloadEvent::Progress(0.5), start);
    assert_eq!(op.progress(), Some(0.5));

    op.apply(DownloadEvent::Completed(PathBuf::from("/d/x.mp3")), start);
    assert_eq!(op.status(), DownloadStatus::Completed);
    assert_eq!(op.progress(), Some(1.0));
    assert_eq!(op.saved_to(), Some(std::path::Path::new("/d/x.mp3")));

    // Late progress from a finished transfer is ignored.
    op.apply(DownloadEvent::Progress(0.1), start);
    assert_eq!(op.progress(), Some(1.0));

    assert!(!op.tick(start + Duration::from_millis(2999)));
    assert_eq!(op.status(), DownloadStatus::Completed);
    assert!(op.tick(start + Duration::from_secs(3)));
    assert_eq!(op.status(), DownloadStatus::Idle);
    assert_eq!(op.filename(), "");
}

#[test]
fn operation_refuses_a_second_download_while_busy() {
    let now = Instant::now();
    let mut op = DownloadOperation::new(Duration::from_secs(3));
    op.begin("a.mp3").unwrap();
    assert!(matches!(op.begin("b.mp3"), Err(DownloadError::Busy)));
    assert_eq!(op.filename(), "a.mp3");

    op.apply(DownloadEvent::Failed("boom".to_string()), now);
    assert_eq!(op.status(), DownloadStatus::Error);
    assert_eq!(op.error(), Some("boom"));

    // A finished operation may be replaced right away.
    op.begin("b.mp3").unwrap();
    assert_eq!(op.status(), DownloadStatus::Downloading);
    assert_eq!(op.error(), None);
}

fn wait_until_finished(m: &mut DownloadManager) {
    for _ in 0..400 {
        m.poll(Instant::now());
        if m.operation().status() != DownloadStatus::Downloading {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("download did not finish");
}

#[test]
fn manager_completes_and_saves_under_sanitized_name() {
    let fetcher = Arc::new(FakeFetcher::ok(1000, 250));
    let saver = Arc::new(MemorySaver::default());
    let mut m = DownloadManager::new(fetcher.clone(), saver.clone(), 4096, Duration::from_secs(3));

    let name = m.start(&track(Some("https://cdn/cafe.mp3"))).unwrap();
    assert_eq!(name, "caf__night_by_dj_spark.mp3");
    wait_until_finished(&mut m);

    assert_eq!(m.operation().status(), DownloadStatus::Completed);
    assert_eq!(m.operation().progress(), Some(1.0));
    assert_eq!(fetcher.calls.lock().unwrap().as_slice(), ["https://cdn/cafe.mp3"]);
    assert_eq!(saver.saved.lock().unwrap()[0].0, "caf__night_by_dj_spark.mp3");
}

#[test]
fn manager_reports_error_on_bad_status() {
    let mut fetcher = FakeFetcher::ok(1000, 250);
    fetcher.status = 500;
    let saver = Arc::new(MemorySaver::default());
    let mut m = DownloadManager::new(Arc::new(fetcher), saver.clone(), 4096, Duration::ZERO);

    m.start(&track(Some("https://cdn/cafe.mp3"))).unwrap();
    for _ in 0..400 {
        m.poll(Instant::now());
        if m.operation().status() != DownloadStatus::Downloading {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    // With a zero reset delay the error is shown and cleared in the same poll.
    assert_eq!(m.operation().status(), DownloadStatus::Idle);
    assert!(saver.saved.lock().unwrap().is_empty());
}

#[test]
fn manager_rejects_tracks_without_media_and_overlapping_requests() {
    let fetcher = Arc::new(FakeFetcher::ok(1000, 250));
    let saver = Arc::new(MemorySaver::default());
    let mut m = DownloadManager::new(fetcher, saver, 4096, Duration::from_secs(3));

    assert!(matches!(m.start(&track(None)), Err(DownloadError::MissingUrl)));
    assert_eq!(m.operation().status(), DownloadStatus::Idle);

    m.start(&track(Some("https://cdn/cafe.mp3"))).unwrap();
    // Not polled yet, so the first transfer is still in flight from the UI's view.
    assert!(matches!(
        m.start(&track(Some("https://cdn/other.mp3"))),
        Err(DownloadError::Busy)
    ));
    wait_until_finished(&mut m);
}
