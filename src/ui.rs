//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::audio::MediaInfo;
use crate::catalog::NewsItem;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::download::{DownloadOperation, DownloadStatus};
use crate::playback::{PlaybackController, PlaybackState};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected song");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L and +/- are filled dynamically from config.
    map.insert("d", "download");
    map.insert("/", "filter");
    map.insert("f", "follow");
    map.insert("K", "metadata");
    map.insert("N", "news");
    map.insert("c", "privacy");
    map.insert("q", "quit");
    map
});

/// Everything a frame shows, borrowed from the runtime for one draw call.
pub struct View<'a> {
    pub app: &'a App,
    pub display: &'a [usize],
    pub playback: &'a PlaybackController,
    pub media: &'a MediaInfo,
    pub download: &'a DownloadOperation,
    pub admin: Option<&'a str>,
}

/// Render the controls help text, incorporating the configured steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "+/-", "d", "/", "f", "K", "N", "c", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!(
                "[+/-] volume {}%",
                (controls.volume_step * 100.0).round()
            )),
            _ => CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}")),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// News popup body: one block per article, newest first.
fn news_text(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return "No news yet".to_string();
    }
    items
        .iter()
        .map(|item| {
            let mut head = String::new();
            if item.featured {
                head.push_str("* ");
            }
            head.push_str(&item.title);
            let meta: Vec<&str> = [item.date(), item.author.as_deref(), item.read_time.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if meta.is_empty() {
                format!("{head}\n{}", item.summary())
            } else {
                format!("{head}\n{}\n{}", meta.join(" · "), item.summary())
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// The user-facing line for a download, or `None` while idle.
fn download_text(op: &DownloadOperation) -> Option<String> {
    match op.status() {
        DownloadStatus::Idle => None,
        DownloadStatus::Downloading => Some(match op.progress() {
            Some(p) => format!("Downloading... {}%", (p * 100.0).round() as u32),
            None => "Downloading...".to_string(),
        }),
        DownloadStatus::Completed => Some(match op.saved_to() {
            Some(path) => format!("Download completed: {}", path.display()),
            None => "Download completed".to_string(),
        }),
        DownloadStatus::Error => Some(match op.error() {
            Some(e) => format!("Download failed: {e}"),
            None => "Download failed".to_string(),
        }),
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn status_text(view: &View, ui: &UiSettings) -> String {
    let app = view.app;
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    match view.playback.current_track() {
        Some(track) => {
            let song = track.display();
            let time = if view.media.loading {
                Some("loading".to_string())
            } else {
                now_playing_time_text(view.media.elapsed, view.media.duration, ui)
            };
            match time {
                Some(time) => parts.push(format!("Song: {song} [{time}]")),
                None => parts.push(format!("Song: {song}")),
            }
            let state = match view.playback.state() {
                PlaybackState::Playing => "Playing",
                PlaybackState::Paused => "Paused",
                PlaybackState::Stopped => "Stopped",
            };
            parts.push(state.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.push(format!("Vol: {}%", (app.volume * 100.0).round() as u32));

    if let Some(email) = view.admin {
        parts.push(format!("Admin: {email}"));
    }
    if let Some(err) = view.media.error.as_deref() {
        parts.push(format!("Audio: {err}"));
    }
    if let Some(msg) = app.status_message.as_deref() {
        parts.push(msg.to_string());
    }

    parts.join(" • ")
}

fn track_items<'a>(app: &'a App, display: &[usize]) -> Vec<ListItem<'a>> {
    let q = app.filter_query.trim();
    let query_lower = if !q.is_empty() && app.uses_lower_titles() {
        Some(q.to_lowercase())
    } else {
        None
    };

    display
        .iter()
        .map(|&i| {
            let track = &app.tracks[i];
            let title = track.display();
            let title = match track.duration_label.as_deref() {
                Some(d) => format!("{title}  ({d})"),
                None => title,
            };
            if q.is_empty() {
                return ListItem::new(title);
            }

            let positions = match query_lower.as_deref() {
                Some(ql) => app.fuzzy_match_positions_for_track_lower(i, ql),
                None => App::fuzzy_match_positions(&track.display(), q),
            };
            let Some(positions) = positions else {
                return ListItem::new(title);
            };

            let mut rendered = String::new();
            let mut pos_iter = positions.into_iter();
            let mut next_pos = pos_iter.next();
            for (ci, ch) in title.chars().enumerate() {
                if next_pos == Some(ci) {
                    rendered.extend(ch.to_uppercase());
                    next_pos = pos_iter.next();
                } else {
                    rendered.push(ch);
                }
            }
            ListItem::new(rendered)
        })
        .collect()
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, view: &View, ui: &UiSettings, controls: &ControlsSettings) {
    let app = view.app;
    let display = view.display;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lekompo ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(view, ui))
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    let status_par = if view.playback.is_playing() {
        status_par
    } else {
        status_par.slow_blink()
    };
    frame.render_widget(status_par, chunks[1]);

    // Main list: only build items for the visible window around the selection.
    {
        let total = display.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let title = if app.has_tracks() {
            " tracks ".to_string()
        } else {
            " tracks (catalog is empty) ".to_string()
        };
        let list = List::new(track_items(app, &display[start..end]))
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlays stay inside the list area so header/status/footer remain visible.
    let list_area = chunks[2];

    if app.metadata_window {
        let popup_area = centered_rect_sized(80, 11, list_area);
        frame.render_widget(Clear, popup_area);

        let meta = match app.selected_track() {
            Some(track) => format!(
                "Title: {}\nArtist: {}\nDuration: {}\nReleased: {}\nGenres: {}\nPlays: {}\nCover: {}",
                track.title,
                track.artist,
                track.duration_label.as_deref().unwrap_or("-"),
                track.release_date.as_deref().unwrap_or("-"),
                if track.genres.is_empty() {
                    "-".to_string()
                } else {
                    track.genres.join(", ")
                },
                track.play_count,
                track.cover_url(&ui.placeholder_image_url),
            ),
            None => "No track selected".to_string(),
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(padded(" metadata (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    if let Some(items) = app.news.as_deref() {
        let popup_area = centered_rect_sized(80, 80, list_area);
        frame.render_widget(Clear, popup_area);
        let news = Paragraph::new(news_text(items))
            .block(padded(" news (N closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(news, popup_area);
    }

    if let Some(text) = download_text(view.download) {
        let width = list_area.width.saturating_sub(4).min(60);
        let area = Rect {
            x: list_area.x + list_area.width.saturating_sub(width + 1),
            y: list_area.y + list_area.height.saturating_sub(4),
            width,
            height: 3.min(list_area.height),
        };
        frame.render_widget(Clear, area);
        let ratio = match view.download.status() {
            DownloadStatus::Completed => 1.0,
            _ => view.download.progress().unwrap_or(0.0) as f64,
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" download "))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(text);
        frame.render_widget(gauge, area);
    }

    if app.consent_prompt {
        let popup_area = centered_rect_sized(70, 8, list_area);
        frame.render_widget(Clear, popup_area);
        let text = "We use analytics events and remember your preferences (like volume) \
                    only with your consent. Necessary storage is always on.\n\n\
                    [a] accept all   [n] necessary only";
        let prompt = Paragraph::new(text)
            .block(padded(" privacy "))
            .wrap(Wrap { trim: true });
        frame.render_widget(prompt, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests;
