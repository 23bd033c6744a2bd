//! File logging. The TUI owns stdout, so records go to a log file only.

use std::path::Path;
use std::time::SystemTime;

use log::LevelFilter;

use crate::config::LoggingSettings;

fn format_line(level: log::Level, target: &str, message: &std::fmt::Arguments) -> String {
    format!(
        "[{} {:<5} {}] {}",
        humantime::format_rfc3339_seconds(SystemTime::now()),
        level,
        target,
        message
    )
}

/// Install the global logger writing to `file`.
pub fn setup_logger(settings: &LoggingSettings, file: &Path) -> Result<(), fern::InitError> {
    let level = LevelFilter::from(settings.level);
    if level == LevelFilter::Off {
        return Ok(());
    }
    if let Some(parent) = file.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(record.level(), record.target(), message)
            ));
        })
        .level(level)
        .level_for("symphonia_core", LevelFilter::Warn)
        .level_for("symphonia_bundle_mp3", LevelFilter::Error)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .level_for("zbus", LevelFilter::Warn)
        .chain(fern::log_file(file)?)
        .apply()?;
    Ok(())
}
