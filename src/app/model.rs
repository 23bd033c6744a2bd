//! Application model: the list view over the catalog.
//!
//! `App` never decides what plays; it owns what the user sees (selection,
//! filter, popups, status line) and hands the visible list to the playback
//! controller as the queue snapshot.

use crate::catalog::{NewsItem, Track, TrackId};

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,

    lower_titles: Option<Vec<String>>,

    pub follow_playback: bool,

    pub filter_mode: bool,
    pub filter_query: String,
    pub metadata_window: bool,
    /// Open news popup with the articles it shows.
    pub news: Option<Vec<NewsItem>>,
    pub consent_prompt: bool,
    pub status_message: Option<String>,
    pub volume: f32,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        // Precompute lowercase titles for larger catalogs to keep filtering cheap per keystroke.
        let lower_titles = if tracks.len() > 100 {
            Some(
                tracks
                    .iter()
                    .map(|t| t.display().to_lowercase())
                    .collect(),
            )
        } else {
            None
        };

        Self {
            tracks,
            selected: 0,
            lower_titles,
            follow_playback: true,
            filter_mode: false,
            filter_query: String::new(),
            metadata_window: false,
            news: None,
            consent_prompt: false,
            status_message: None,
            volume: 1.0,
        }
    }

    /// Swap in a freshly fetched catalog, keeping the cursor on the same track when it survives.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        let selected_id = self.tracks.get(self.selected).map(|t| t.id.clone());
        let fresh = Self::new(tracks);
        self.tracks = fresh.tracks;
        self.lower_titles = fresh.lower_titles;
        self.selected = selected_id
            .and_then(|id| self.tracks.iter().position(|t| t.id == id))
            .unwrap_or(0);
        self.ensure_selected_visible();
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn show_news(&mut self, items: Vec<NewsItem>) {
        self.news = Some(items);
    }

    pub fn close_news(&mut self) {
        self.news = None;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Change the volume by `delta`, clamped to `0.0..=1.0`. Returns the new value.
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        let v = (self.volume + delta).clamp(0.0, 1.0);
        self.volume = (v * 100.0).round() / 100.0;
        self.volume
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// The highlighted track, if it is visible.
    pub fn selected_track(&self) -> Option<&Track> {
        if !self.display_indices().contains(&self.selected) {
            return None;
        }
        self.tracks.get(self.selected)
    }

    /// Return the display order of track indices, taking the filter into account.
    pub fn display_indices(&self) -> Vec<usize> {
        let base = 0..self.tracks.len();

        let query = self.filter_query.trim();
        if query.is_empty() {
            return base.collect();
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                let query_lower = query.to_lowercase();
                base.filter(|&i| {
                    Self::fuzzy_match_positions_lower(&lower_titles[i], &query_lower).is_some()
                })
                .collect()
            }
            None => base
                .filter(|&i| Self::fuzzy_match_positions(&self.tracks[i].display(), query).is_some())
                .collect(),
        }
    }

    /// The visible tracks in display order: the queue snapshot handed to playback.
    pub fn visible_tracks(&self) -> Vec<Track> {
        self.display_indices()
            .into_iter()
            .map(|i| self.tracks[i].clone())
            .collect()
    }

    /// Return true if this `App` uses precomputed lowercase titles.
    pub fn uses_lower_titles(&self) -> bool {
        self.lower_titles.is_some()
    }

    /// Fuzzy-match `query_lower` against a specific track by index.
    ///
    /// Returns the character positions that match, or `None` when there is no match.
    pub fn fuzzy_match_positions_for_track_lower(
        &self,
        track_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                Self::fuzzy_match_positions_lower(&lower_titles[track_index], query_lower)
            }
            None => Self::fuzzy_match_positions(&self.tracks[track_index].display(), query_lower),
        }
    }

    /// Return the next visible index after `current`, wrapping to the first.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping to the last.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
            None => Some(display[display.len() - 1]),
        }
    }

    /// Set the selected track index and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move the cursor onto the playing track when following is on and it is visible.
    pub fn follow_track(&mut self, id: &TrackId) {
        if !self.follow_playback || self.filter_mode {
            return;
        }
        if let Some(i) = self.tracks.iter().position(|t| &t.id == id)
            && self.display_indices().contains(&i)
        {
            self.selected = i;
        }
    }

    pub fn toggle_follow_playback(&mut self) {
        self.follow_playback = !self.follow_playback;
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars().flat_map(char::to_lowercase) {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_lowercase().eq(std::iter::once(qc)) => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    fn fuzzy_match_positions_lower(title_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc == qc => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode. The cursor does not follow playback while it is active.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }
}
