use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::config::CatalogSettings;
use crate::http::{build_client, endpoint};
use crate::session::SessionContext;

use super::model::{SongRow, Track, TrackId};
use super::news::{NewsItem, NewsRow};
use super::provider::{Catalog, CatalogError, news_from_rows, tracks_from_rows};

/// `Catalog` backed by the project's PostgREST API.
pub struct SupabaseCatalog {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
    news_table: String,
    order_column: String,
    session: SessionContext,
}

#[derive(Deserialize)]
struct PlaysRow {
    #[serde(default)]
    plays: Option<i64>,
}

#[derive(Serialize)]
struct PlaysPatch {
    plays: u64,
}

impl SupabaseCatalog {
    pub fn new(settings: &CatalogSettings, session: SessionContext) -> Result<Self, CatalogError> {
        if settings.base_url.trim().is_empty() {
            return Err(CatalogError::NotConfigured("catalog.base_url is empty"));
        }
        if settings.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured("catalog.api_key is empty"));
        }

        Ok(Self {
            client: build_client(Some(Duration::from_secs(settings.timeout_secs)))?,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            table: settings.table.clone(),
            news_table: settings.news_table.clone(),
            order_column: settings.order_column.clone(),
            session,
        })
    }

    pub(super) fn table_url(&self) -> String {
        endpoint(&self.base_url, &format!("/rest/v1/{}", self.table))
    }

    pub(super) fn news_url(&self) -> String {
        endpoint(&self.base_url, &format!("/rest/v1/{}", self.news_table))
    }

    pub(super) fn list_query(&self) -> [(&'static str, String); 2] {
        [
            ("select", "*".to_string()),
            ("order", format!("{}.desc", self.order_column)),
        ]
    }

    /// Admin session token when signed in, anon key otherwise.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .bearer_token()
            .unwrap_or_else(|| self.api_key.clone());
        req.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    fn current_plays(&self, id: &TrackId) -> Result<u64, CatalogError> {
        let resp = self
            .authorize(self.client.get(self.table_url()))
            .query(&[
                ("id", format!("eq.{id}")),
                ("select", "plays".to_string()),
            ])
            .send()?;
        let rows: Vec<PlaysRow> = check_status(resp)?.json()?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        Ok(row.plays.unwrap_or(0).max(0) as u64)
    }
}

fn check_status(resp: Response) -> Result<Response, CatalogError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(CatalogError::Status {
        status: status.as_u16(),
        body: resp.text().unwrap_or_default(),
    })
}

impl Catalog for SupabaseCatalog {
    fn list_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        let resp = self
            .authorize(self.client.get(self.table_url()))
            .query(&self.list_query())
            .send()?;
        let rows: Vec<SongRow> = check_status(resp)?.json()?;
        debug!("catalog returned {} rows", rows.len());
        Ok(tracks_from_rows(rows))
    }

    fn increment_play_count(&self, id: &TrackId) -> Result<(), CatalogError> {
        let plays = self.current_plays(id)?;
        let resp = self
            .authorize(self.client.patch(self.table_url()))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&PlaysPatch { plays: plays + 1 })
            .send()?;
        check_status(resp)?;
        debug!("play count of {id} is now {}", plays + 1);
        Ok(())
    }

    fn list_news(&self) -> Result<Vec<NewsItem>, CatalogError> {
        let resp = self
            .authorize(self.client.get(self.news_url()))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()?;
        let rows: Vec<NewsRow> = check_status(resp)?.json()?;
        debug!("news returned {} rows", rows.len());
        Ok(news_from_rows(rows))
    }
}
