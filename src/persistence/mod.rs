//! Preference persistence
//!
//! A single JSON file in the user's local data directory holding the high
//! score and the theme choice. Failing to read or write it is never fatal:
//! the game logs a warning and carries on with in-memory values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::HighScoreStore;

const APP_DIR: &str = "bubble-buster";
const FILE_NAME: &str = "preferences.json";

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub high_score: u64,
    pub dark_theme: bool,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Could not determine a local data directory")]
    NoDataDir,
    #[error("I/O error on preferences file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed preferences file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Preferences backed by a file
#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferencesStore {
    /// Default location: `<data_local_dir>/bubble-buster/preferences.json`
    pub fn default_path() -> Result<PathBuf, PersistenceError> {
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
            .ok_or(PersistenceError::NoDataDir)
    }

    /// Open the store at the default location, or an in-memory fallback
    /// if no data directory exists
    pub fn open_default() -> Self {
        match Self::default_path() {
            Ok(path) => Self::open(path),
            Err(e) => {
                log::warn!("{e}, preferences will not be saved");
                Self {
                    path: PathBuf::new(),
                    prefs: Preferences::default(),
                }
            }
        }
    }

    /// Open the store at `path`. A missing or unreadable file starts fresh.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match Self::try_load(&path) {
            Ok(Some(prefs)) => {
                log::info!("Loaded preferences from {:?}", path);
                prefs
            }
            Ok(None) => {
                log::info!("No preferences file at {:?}, starting fresh", path);
                Preferences::default()
            }
            Err(e) => {
                log::warn!("Failed to load preferences: {e}");
                Preferences::default()
            }
        };
        Self { path, prefs }
    }

    /// Read `path`; `Ok(None)` when it does not exist
    pub fn try_load(path: &Path) -> Result<Option<Preferences>, PersistenceError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| PersistenceError::Json {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write current preferences, creating the directory if needed
    pub fn save(&self) -> Result<(), PersistenceError> {
        if self.path.as_os_str().is_empty() {
            return Err(PersistenceError::NoDataDir);
        }
        let io_err = |source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json =
            serde_json::to_string_pretty(&self.prefs).map_err(|source| PersistenceError::Json {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, json).map_err(io_err)?;
        log::debug!("Preferences saved to {:?}", self.path);
        Ok(())
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dark_theme(&self) -> bool {
        self.prefs.dark_theme
    }

    pub fn set_dark_theme(&mut self, dark: bool) {
        self.prefs.dark_theme = dark;
        self.save_or_warn();
    }

    fn save_or_warn(&self) {
        if let Err(e) = self.save() {
            log::warn!("Failed to save preferences: {e}");
        }
    }
}

impl HighScoreStore for PreferencesStore {
    fn high_score(&self) -> u64 {
        self.prefs.high_score
    }

    fn set_high_score(&mut self, score: u64) {
        self.prefs.high_score = score;
        self.save_or_warn();
    }
}
