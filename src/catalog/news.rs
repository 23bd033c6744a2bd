use serde::Deserialize;
use thiserror::Error;

use super::model::{RowId, non_blank};

/// One published news article, read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Free-form label such as "5 min read".
    pub read_time: Option<String>,
    pub created_at: Option<String>,
    pub featured: bool,
}

impl NewsItem {
    /// Calendar date part of `created_at`, when present.
    pub fn date(&self) -> Option<&str> {
        self.created_at
            .as_deref()
            .map(|ts| ts.split_once('T').map_or(ts, |(day, _)| day))
    }

    /// Short text for lists: the excerpt, or the start of the body.
    pub fn summary(&self) -> &str {
        self.excerpt
            .as_deref()
            .or(self.content.as_deref())
            .unwrap_or("")
    }
}

/// A `news` row exactly as the store returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsRow {
    pub id: RowId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NewsError {
    #[error("news item {id} has no title")]
    BlankTitle { id: String },
}

impl TryFrom<NewsRow> for NewsItem {
    type Error = NewsError;

    fn try_from(row: NewsRow) -> Result<Self, Self::Error> {
        let id = row.id.into_string();
        let Some(title) = non_blank(row.title) else {
            return Err(NewsError::BlankTitle { id });
        };

        Ok(NewsItem {
            id,
            title,
            excerpt: non_blank(row.excerpt),
            content: non_blank(row.content),
            author: non_blank(row.author),
            category: non_blank(row.category),
            image_url: non_blank(row.image_url),
            read_time: non_blank(row.read_time),
            created_at: non_blank(row.created_at),
            featured: row.featured.unwrap_or(false),
        })
    }
}
