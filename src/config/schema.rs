use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lekompo/config.toml` or `~/.config/lekompo/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LEKOMPO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub auth: AuthSettings,
    pub downloads: DownloadSettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub consent: ConsentSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Project URL of the hosted backend, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key sent as `apikey` on every request.
    pub api_key: String,
    /// Table holding the song rows.
    pub table: String,
    /// Table holding the news articles.
    pub news_table: String,
    /// Column used to order listings, newest first.
    pub order_column: String,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            table: "songs".to_string(),
            news_table: "news".to_string(),
            order_column: "created_at".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Admin account to sign in with at startup. Leave unset to browse anonymously.
    pub admin_email: Option<String>,
    /// Name of the environment variable holding the admin password.
    pub password_env: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            admin_email: None,
            password_env: "LEKOMPO_ADMIN_PASSWORD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Where finished downloads are saved. Defaults to `~/Downloads`.
    pub directory: Option<PathBuf>,
    /// Read buffer size per chunk (bytes).
    pub chunk_size: usize,
    /// How long a completed/failed download stays visible before resetting (milliseconds).
    pub status_reset_ms: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            directory: None,
            chunk_size: 16 * 1024,
            status_reset_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume used until the user picks one (0.0 - 1.0).
    pub initial_volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Give up fetching a track for playback after this many seconds.
    pub load_timeout_secs: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            quit_fade_out_ms: 500,
            load_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,

    /// Cover art shown for tracks without an image.
    pub placeholder_image_url: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Lekompo: stream & download ~ ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total],
            now_playing_time_separator: " / ".to_string(),
            placeholder_image_url:
                "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=60&h=60&fit=crop"
                    .to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsentSettings {
    /// Consent/preference store. Defaults to `$XDG_DATA_HOME/lekompo/consent.toml`.
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevelSetting,
    /// Log file. Defaults to `$XDG_DATA_HOME/lekompo/lekompo.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevelSetting::Info,
            file: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevelSetting {
    Off,
    Error,
    #[serde(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelSetting> for log::LevelFilter {
    fn from(level: LogLevelSetting) -> Self {
        match level {
            LogLevelSetting::Off => log::LevelFilter::Off,
            LogLevelSetting::Error => log::LevelFilter::Error,
            LogLevelSetting::Warn => log::LevelFilter::Warn,
            LogLevelSetting::Info => log::LevelFilter::Info,
            LogLevelSetting::Debug => log::LevelFilter::Debug,
            LogLevelSetting::Trace => log::LevelFilter::Trace,
        }
    }
}
