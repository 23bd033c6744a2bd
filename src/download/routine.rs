use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use thiserror::Error;

use super::fetch::Fetcher;
use super::save::Saver;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("track has no media URL")]
    MissingUrl,
    #[error("a download is already in progress")]
    Busy,
    #[error("network error: {0}")]
    Network(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("could not save file: {0}")]
    Save(#[source] std::io::Error),
}

/// Fetch `url` completely, reading `chunk_size` bytes at a time.
///
/// `on_progress` receives `received / total` after every chunk when the
/// response announces a non-zero length; otherwise it is never called.
pub fn fetch_payload(
    fetcher: &dyn Fetcher,
    url: &str,
    chunk_size: usize,
    mut on_progress: impl FnMut(f32),
) -> Result<Vec<u8>, DownloadError> {
    if url.trim().is_empty() {
        return Err(DownloadError::MissingUrl);
    }

    let resp = fetcher
        .fetch(url)
        .map_err(|e| DownloadError::Network(e.to_string()))?;
    if !resp.is_success() {
        return Err(DownloadError::Status(resp.status));
    }

    let total = resp.content_length.filter(|&n| n > 0);
    let mut body = resp.body;
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut payload: Vec<u8> = Vec::with_capacity(total.unwrap_or(0).min(64 << 20) as usize);

    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DownloadError::Network(e.to_string())),
        };
        payload.extend_from_slice(&buf[..n]);

        if let Some(total) = total {
            let fraction = (payload.len() as f64 / total as f64).min(1.0);
            on_progress(fraction as f32);
        }
    }

    Ok(payload)
}

/// Fetch `url` and hand the assembled payload to `saver` as `filename`.
///
/// Nothing is saved unless the whole transfer succeeded.
pub fn download(
    fetcher: &dyn Fetcher,
    saver: &dyn Saver,
    url: &str,
    filename: &str,
    chunk_size: usize,
    on_progress: impl FnMut(f32),
) -> Result<PathBuf, DownloadError> {
    let payload = fetch_payload(fetcher, url, chunk_size, on_progress)?;
    saver.save(filename, &payload).map_err(DownloadError::Save)
}
