use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Consent per category. `necessary` is implied by giving consent at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPreferences {
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub preferences: bool,
}

impl ConsentPreferences {
    pub fn accept_all() -> Self {
        Self {
            necessary: true,
            analytics: true,
            marketing: true,
            preferences: true,
        }
    }

    pub fn necessary_only() -> Self {
        Self {
            necessary: true,
            analytics: false,
            marketing: false,
            preferences: false,
        }
    }
}

/// On-disk layout of the consent store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsentFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentPreferences>,
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("consent store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("consent store is corrupt: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not encode consent store: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// TOML file backing the consent manager. A missing file means "no consent yet".
pub struct ConsentStore {
    path: PathBuf,
}

impl ConsentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ConsentFile, ConsentError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ConsentFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, file: &ConsentFile) -> Result<(), ConsentError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(file)?)?;
        Ok(())
    }
}
