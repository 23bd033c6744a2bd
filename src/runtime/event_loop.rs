use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{MediaBinding, MediaCmd};
use crate::catalog::TrackId;
use crate::config;
use crate::consent::ConsentPreferences;
use crate::download::DownloadError;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playback::{PlaybackController, PlaybackResult, PlaybackState};
use crate::runtime::mpris_sync::update_mpris;
use crate::runtime::startup::{Services, VOLUME_PREFERENCE};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Pushes controller intent onto the audio thread.
    pub binding: MediaBinding,
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last-known current track as emitted to MPRIS.
    pub last_mpris_track: Option<TrackId>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything the loop mutates, borrowed from `runtime::run`.
pub struct LoopContext<'a> {
    pub settings: &'a config::Settings,
    pub app: &'a mut App,
    pub controller: &'a mut PlaybackController,
    pub services: &'a mut Services,
    pub mpris: &'a MprisHandle,
    pub control_tx: &'a mpsc::Sender<ControlCmd>,
    pub control_rx: &'a mpsc::Receiver<ControlCmd>,
}

/// Controller no-ops are expected (e.g. `next` with nothing playing).
fn ignore_noop(what: &str, result: PlaybackResult) {
    if let Err(noop) = result {
        debug!("{what} ignored: {noop:?}");
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the audio
/// thread, downloads and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    cx: &mut LoopContext,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Natural end of a track advances the queue.
        if let Some(url) = cx.services.media.take_ended() {
            if state.binding.media_ended(&url, cx.controller) {
                ignore_noop("auto-advance", cx.controller.on_track_ended());
            } else {
                debug!("ignoring end of {url}, it is no longer the current track");
            }
        }
        state.binding.sync(cx.controller, &cx.services.media);

        cx.services.downloads.poll(Instant::now());

        if let Some(id) = cx.controller.current_id() {
            cx.app.follow_track(id);
        }

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        let current = cx.controller.current_id().cloned();
        if current != state.last_mpris_track || cx.controller.state() != state.last_mpris_playback
        {
            update_mpris(cx.mpris, cx.controller);
            state.last_mpris_track = current;
            state.last_mpris_playback = cx.controller.state();
        }

        let display = cx.app.display_indices();
        let media = cx.services.media.info();
        let admin = cx
            .services
            .session
            .active(SystemTime::now())
            .map(|s| s.user.email);
        let view = ui::View {
            app: &*cx.app,
            display: &display,
            playback: &*cx.controller,
            media: &media,
            download: cx.services.downloads.operation(),
            admin: admin.as_deref(),
        };
        terminal.draw(|f| ui::draw(f, &view, &cx.settings.ui, &cx.settings.controls))?;

        while let Ok(cmd) = cx.control_rx.try_recv() {
            if handle_control_cmd(cmd, cx) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key_event(key, cx, state) {
                break;
            }
        }
    }

    Ok(())
}

/// Start the highlighted track with the visible list as its queue, or
/// toggle it when it is already current.
fn play_selected(cx: &mut LoopContext) {
    let Some(track) = cx.app.selected_track().cloned() else {
        return;
    };
    let starting = cx.controller.current_id() != Some(&track.id);
    let queue = cx.app.visible_tracks();
    match cx.controller.play_or_toggle(&track, &queue) {
        Ok(()) => {
            if starting {
                cx.services
                    .consent
                    .track_event("play", Some(track.id.as_str()));
            }
        }
        Err(noop) => {
            debug!("play ignored: {noop:?}");
            if !track.can_play() {
                cx.app.set_status(format!("{} has no audio", track.display()));
            }
        }
    }
}

fn handle_control_cmd(cmd: ControlCmd, cx: &mut LoopContext) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if cx.controller.current_track().is_some() {
                ignore_noop("play", cx.controller.play());
            } else {
                play_selected(cx);
            }
        }
        ControlCmd::Pause => ignore_noop("pause", cx.controller.pause()),
        ControlCmd::PlayPause => {
            if cx.controller.current_track().is_some() {
                ignore_noop("toggle", cx.controller.toggle_play_pause());
            } else {
                play_selected(cx);
            }
        }
        ControlCmd::Stop => cx.controller.reset(),
        ControlCmd::Next => ignore_noop("next", cx.controller.next()),
        ControlCmd::Prev => ignore_noop("previous", cx.controller.previous()),
    }
    false
}

fn change_volume(cx: &mut LoopContext, delta: f32) {
    let volume = cx.app.adjust_volume(delta);
    cx.services.media.send(MediaCmd::SetVolume(volume));
    // Only remembered with preferences consent.
    cx.services
        .consent
        .save_user_preference(VOLUME_PREFERENCE, &volume.to_string());
}

fn start_download(cx: &mut LoopContext) {
    let Some(track) = cx.app.selected_track().cloned() else {
        return;
    };
    match cx.services.downloads.start(&track) {
        Ok(_) => {
            cx.app.clear_status();
            cx.services
                .consent
                .track_event("download", Some(track.id.as_str()));
        }
        Err(DownloadError::Busy) => cx.app.set_status("A download is already in progress"),
        Err(e) => cx.app.set_status(format!("Cannot download: {e}")),
    }
}

fn refresh_catalog(cx: &mut LoopContext) {
    let Some(catalog) = cx.services.catalog.clone() else {
        cx.app.set_status("Catalog unavailable");
        return;
    };
    match catalog.list_tracks() {
        Ok(tracks) => {
            info!("reloaded {} tracks", tracks.len());
            cx.app.set_tracks(tracks);
            cx.app.clear_status();
        }
        Err(e) => {
            warn!("reload failed: {e}");
            cx.app.set_status(format!("Could not load tracks: {e}"));
        }
    }
}

fn toggle_news(cx: &mut LoopContext) {
    if cx.app.news.is_some() {
        cx.app.close_news();
        return;
    }
    let Some(catalog) = cx.services.catalog.clone() else {
        cx.app.set_status("Catalog unavailable");
        return;
    };
    match catalog.list_news() {
        Ok(items) => {
            debug!("showing {} news items", items.len());
            cx.app.show_news(items);
        }
        Err(e) => {
            warn!("could not load news: {e}");
            cx.app.set_status(format!("Could not load news: {e}"));
        }
    }
}

fn record_consent(cx: &mut LoopContext, prefs: ConsentPreferences) {
    cx.services.consent.save_consent(prefs);
    cx.app.consent_prompt = false;
    cx.services.consent.track_event("consent_given", None);
}

fn handle_key_event(key: KeyEvent, cx: &mut LoopContext, state: &mut EventLoopState) -> bool {
    if cx.app.consent_prompt {
        match key.code {
            KeyCode::Char('a') => record_consent(cx, ConsentPreferences::accept_all()),
            KeyCode::Char('n') => record_consent(cx, ConsentPreferences::necessary_only()),
            KeyCode::Esc => cx.app.consent_prompt = false,
            KeyCode::Char('q') => return true,
            _ => {}
        }
        return false;
    }

    if cx.app.filter_mode {
        state.pending_gg = false;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => cx.app.clear_filter(),
            KeyCode::Backspace => cx.app.pop_filter_char(),
            KeyCode::Down => cx.app.next(),
            KeyCode::Up => cx.app.prev(),
            KeyCode::Char('j' | 'n') if ctrl => cx.app.next(),
            KeyCode::Char('k' | 'p') if ctrl => cx.app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    cx.app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                if cx.app.display_indices().is_empty() {
                    return false;
                }
                cx.app.exit_filter_mode();
                play_selected(cx);
            }
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => cx.app.enter_filter_mode(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                if let Some(&first) = cx.app.display_indices().first() {
                    cx.app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            if let Some(&last) = cx.app.display_indices().last() {
                cx.app.set_selected(last);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            cx.app.follow_playback = false;
            cx.app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            cx.app.follow_playback = false;
            cx.app.prev();
        }
        KeyCode::Char('f') => cx.app.toggle_follow_playback(),
        KeyCode::Enter => {
            cx.app.follow_playback = true;
            play_selected(cx);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = cx.control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = cx.control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = cx.control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            let secs = cx.settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            cx.services.media.send(MediaCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = cx.settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            cx.services.media.send(MediaCmd::SeekBy(-secs));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let step = cx.settings.controls.volume_step;
            change_volume(cx, step);
        }
        KeyCode::Char('-') => {
            let step = cx.settings.controls.volume_step;
            change_volume(cx, -step);
        }
        KeyCode::Char('d') => start_download(cx),
        KeyCode::Char('r') => refresh_catalog(cx),
        KeyCode::Char('K') => cx.app.toggle_metadata_window(),
        KeyCode::Char('N') => toggle_news(cx),
        KeyCode::Esc if cx.app.news.is_some() => cx.app.close_news(),
        KeyCode::Char('c') => cx.app.consent_prompt = true,
        _ => {}
    }

    false
}
