use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Opaque catalog identifier of a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One streamable/downloadable audio item.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Audio payload. `None` means the track can be neither played nor downloaded.
    pub media_url: Option<String>,
    pub image_url: Option<String>,
    /// Free-form length label such as "3:45"; never used for arithmetic.
    pub duration_label: Option<String>,
    pub release_date: Option<String>,
    pub play_count: u64,
    pub genres: Vec<String>,
}

impl Track {
    pub fn can_play(&self) -> bool {
        self.media_url.is_some()
    }

    /// "Artist - Title", as shown in lists.
    pub fn display(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// Cover art URL, or `placeholder` when the track has none.
    pub fn cover_url<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.image_url.as_deref().unwrap_or(placeholder)
    }
}

/// Row identifiers may be uuids (strings) or serial integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    pub fn into_string(self) -> String {
        match self {
            RowId::Text(s) => s,
            RowId::Number(n) => n.to_string(),
        }
    }
}

impl From<RowId> for TrackId {
    fn from(id: RowId) -> Self {
        TrackId(id.into_string())
    }
}

/// A `songs` row exactly as the store returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRow {
    pub id: RowId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub plays: Option<i64>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("track {id} has no title")]
    BlankTitle { id: TrackId },
    #[error("track {id} has no artist")]
    BlankArtist { id: TrackId },
    #[error("track {id} has a negative play count ({plays})")]
    NegativePlayCount { id: TrackId, plays: i64 },
}

pub(super) fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<SongRow> for Track {
    type Error = TrackError;

    fn try_from(row: SongRow) -> Result<Self, Self::Error> {
        let id = TrackId::from(row.id);

        let Some(title) = non_blank(row.title) else {
            return Err(TrackError::BlankTitle { id });
        };
        let Some(artist) = non_blank(row.artist) else {
            return Err(TrackError::BlankArtist { id });
        };
        let play_count = match row.plays {
            None => 0,
            Some(p) if p < 0 => return Err(TrackError::NegativePlayCount { id, plays: p }),
            Some(p) => p as u64,
        };

        Ok(Track {
            id,
            title,
            artist,
            media_url: non_blank(row.download_url),
            image_url: non_blank(row.image_url),
            duration_label: non_blank(row.duration),
            release_date: non_blank(row.release_date),
            play_count,
            genres: row
                .genre
                .unwrap_or_default()
                .into_iter()
                .filter_map(|g| non_blank(Some(g)))
                .collect(),
        })
    }
}
