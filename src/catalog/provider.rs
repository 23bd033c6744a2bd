use log::warn;
use thiserror::Error;

use super::model::{SongRow, Track, TrackId};
use super::news::{NewsItem, NewsRow};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("track {0} not found")]
    NotFound(TrackId),
}

/// Read and play-count access to the hosted track catalog.
///
/// Every call is a fresh snapshot; nothing is cached.
pub trait Catalog: Send + Sync {
    /// All tracks, newest first.
    fn list_tracks(&self) -> Result<Vec<Track>, CatalogError>;

    /// Bump the play counter of `id` by one.
    fn increment_play_count(&self, id: &TrackId) -> Result<(), CatalogError>;

    /// Published news articles, newest first.
    fn list_news(&self) -> Result<Vec<NewsItem>, CatalogError>;
}

/// Validate raw rows, keeping order and skipping (with a warning) the ones
/// that do not make a usable `Track`.
pub fn tracks_from_rows(rows: Vec<SongRow>) -> Vec<Track> {
    rows.into_iter()
        .filter_map(|row| match Track::try_from(row) {
            Ok(track) => Some(track),
            Err(e) => {
                warn!("skipping catalog row: {e}");
                None
            }
        })
        .collect()
}

/// Same as [`tracks_from_rows`], for news rows.
pub fn news_from_rows(rows: Vec<NewsRow>) -> Vec<NewsItem> {
    rows.into_iter()
        .filter_map(|row| match NewsItem::try_from(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping news row: {e}");
                None
            }
        })
        .collect()
}
