use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, notice) = settings::load_settings();

    match settings.log_file_path() {
        Some(file) => {
            if let Err(e) = logging::setup_logger(&settings.logging, &file) {
                eprintln!("lekompo: logging disabled: {e}");
            }
        }
        None => eprintln!("lekompo: no data directory, logging disabled"),
    }
    info!("lekompo {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(notice) = notice.as_deref() {
        warn!("{notice}");
    }

    let startup::Startup {
        mut services,
        mut controller,
        tracks,
        volume,
        notice: startup_notice,
    } = startup::start(&settings)?;

    let mut app = App::new(tracks);
    app.volume = volume;
    app.consent_prompt = !services.consent.has_consent();
    if let Some(msg) = startup_notice.or(notice) {
        app.set_status(msg);
    }

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    mpris_sync::update_mpris(&mpris, &controller);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = {
        let mut state = event_loop::EventLoopState::new();
        let mut cx = event_loop::LoopContext {
            settings: &settings,
            app: &mut app,
            controller: &mut controller,
            services: &mut services,
            mpris: &mpris,
            control_tx: &control_tx,
            control_rx: &control_rx,
        };
        event_loop::run(&mut terminal, &mut cx, &mut state)
    };

    // Hand the terminal back before waiting on background threads.
    let restored = restore_terminal(&mut terminal);
    services.shutdown(&settings);
    restored?;

    if let Err(e) = run_result.as_ref() {
        warn!("event loop failed: {e}");
    }
    info!("bye");
    run_result
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
) -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
