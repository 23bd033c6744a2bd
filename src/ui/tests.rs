use super::*;
use crate::catalog::NewsItem;
use crate::download::DownloadEvent;
use std::path::PathBuf;
use std::time::Instant;

#[test]
fn format_mmss_pads_minutes_and_seconds() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
    assert_eq!(format_mmss(Duration::from_secs(75)), "01:15");
    assert_eq!(format_mmss(Duration::from_millis(3_599_999)), "59:59");
}

#[test]
fn time_text_follows_configured_fields() {
    let ui = UiSettings {
        now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total, TimeField::Remaining],
        ..UiSettings::default()
    };
    let text = now_playing_time_text(Duration::from_secs(30), Some(Duration::from_secs(90)), &ui);
    assert_eq!(text.as_deref(), Some("00:30 / 01:30 / -01:00"));

    // Unknown total drops the fields that need it.
    let text = now_playing_time_text(Duration::from_secs(30), None, &ui);
    assert_eq!(text.as_deref(), Some("00:30"));
}

#[test]
fn time_text_is_none_without_fields() {
    let ui = UiSettings {
        now_playing_time_fields: Vec::new(),
        ..UiSettings::default()
    };
    assert!(now_playing_time_text(Duration::ZERO, None, &ui).is_none());
}

#[test]
fn download_text_tracks_the_operation() {
    let now = Instant::now();
    let mut op = DownloadOperation::new(Duration::from_secs(3));
    assert!(download_text(&op).is_none());

    op.begin("song_by_band.mp3").unwrap();
    assert_eq!(download_text(&op).as_deref(), Some("Downloading..."));

    op.apply(DownloadEvent::Progress(0.5), now);
    assert_eq!(download_text(&op).as_deref(), Some("Downloading... 50%"));

    op.apply(DownloadEvent::Completed(PathBuf::from("/tmp/song_by_band.mp3")), now);
    assert_eq!(
        download_text(&op).as_deref(),
        Some("Download completed: /tmp/song_by_band.mp3")
    );
}

#[test]
fn download_text_reports_failure() {
    let mut op = DownloadOperation::new(Duration::from_secs(3));
    op.begin("x_by_y.mp3").unwrap();
    op.apply(
        DownloadEvent::Failed("server answered with status 404".into()),
        Instant::now(),
    );
    assert_eq!(
        download_text(&op).as_deref(),
        Some("Download failed: server answered with status 404")
    );
}

#[test]
fn controls_text_uses_configured_steps() {
    let controls = ControlsSettings {
        scrub_seconds: 10,
        volume_step: 0.05,
    };
    let text = controls_text(&controls);
    assert!(text.contains("[H/L] scrub -/+10s"));
    assert!(text.contains("[+/-] volume 5%"));
    assert!(text.starts_with("[j/k] up/down"));
    assert!(text.contains("[N] news"));
    assert!(text.ends_with("[q] quit"));
}

#[test]
fn centered_rect_stays_inside_area() {
    let area = Rect::new(0, 0, 40, 10);
    let r = centered_rect_sized(80, 20, area);
    assert!(r.width <= 38);
    assert!(r.height <= 8);
    assert!(r.x + r.width <= area.width);
    assert!(r.y + r.height <= area.height);
}

fn news(title: &str, excerpt: Option<&str>) -> NewsItem {
    NewsItem {
        id: title.to_lowercase(),
        title: title.to_string(),
        excerpt: excerpt.map(str::to_string),
        content: Some("Body".to_string()),
        author: None,
        category: None,
        image_url: None,
        read_time: None,
        created_at: None,
        featured: false,
    }
}

#[test]
fn news_text_lists_articles_with_their_details() {
    assert_eq!(news_text(&[]), "No news yet");

    let mut featured = news("Tour dates", Some("Twelve cities"));
    featured.featured = true;
    featured.created_at = Some("2024-03-09T08:00:00Z".to_string());
    featured.read_time = Some("3 min read".to_string());
    let plain = news("Studio diary", None);

    let text = news_text(&[featured, plain]);
    assert_eq!(
        text,
        "* Tour dates\n2024-03-09 · 3 min read\nTwelve cities\n\nStudio diary\nBody"
    );
}
