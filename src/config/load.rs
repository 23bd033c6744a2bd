use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `LEKOMPO__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("LEKOMPO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.downloads.chunk_size == 0 {
            return Err("downloads.chunk_size must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.initial_volume) {
            return Err("audio.initial_volume must be between 0.0 and 1.0".to_string());
        }
        if self.audio.load_timeout_secs == 0 {
            return Err("audio.load_timeout_secs must be >= 1".to_string());
        }
        if self.controls.volume_step <= 0.0 || self.controls.volume_step > 1.0 {
            return Err("controls.volume_step must be in (0.0, 1.0]".to_string());
        }
        if self.catalog.timeout_secs == 0 {
            return Err("catalog.timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }

    /// Directory finished downloads are written to.
    pub fn download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.downloads.directory {
            return dir.clone();
        }
        if let Some(xdg) = env::var_os("XDG_DOWNLOAD_DIR") {
            return PathBuf::from(xdg);
        }
        match env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join("Downloads"),
            None => PathBuf::from("."),
        }
    }

    /// Location of the consent/preference store.
    pub fn consent_store_path(&self) -> Option<PathBuf> {
        self.consent
            .store_path
            .clone()
            .or_else(|| data_dir().map(|d| d.join("consent.toml")))
    }

    /// Location of the log file.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.logging
            .file
            .clone()
            .or_else(|| data_dir().map(|d| d.join("lekompo.log")))
    }
}

/// Resolve the config path from `LEKOMPO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LEKOMPO_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/lekompo/config.toml`
/// or `~/.config/lekompo/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("lekompo").join("config.toml"))
}

/// Per-user data directory: `$XDG_DATA_HOME/lekompo` or `~/.local/share/lekompo`.
pub fn data_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("lekompo"))
}
