use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, TranscriptError};
use crate::transcript::TranscriptOptions;

pub const SETTINGS_FILE: &str = "settings.json";

/// Persisted defaults for transcript exports. Command-line flags override them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Footer text, email removal and role labels used when a flag is absent.
    pub defaults: TranscriptOptions,
    /// Where archived transcripts are written.
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    /// Archive directory: the configured one, else the platform data dir.
    pub fn resolved_output_dir(&self) -> Option<PathBuf> {
        self.output_dir.clone().or_else(|| {
            ProjectDirs::from("com", "chat-transcript", "chat-transcript")
                .map(|proj| proj.data_dir().join("transcripts"))
        })
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "chat-transcript", "chat-transcript") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "failed to create config dir");
            return None;
        }
        return Some(dir.join(SETTINGS_FILE));
    }
    None
}

/// Read settings from `path`. A missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(TranscriptError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content)
        .map_err(|e| TranscriptError::Config(format!("{}: {}", path.display(), e)))
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    let write_err = |source| TranscriptError::Write {
        path: path.to_path_buf(),
        source,
    };
    let data = serde_json::to_string_pretty(settings)?;
    let mut file = fs::File::create(path).map_err(write_err)?;
    file.write_all(data.as_bytes()).map_err(write_err)?;
    Ok(())
}

pub fn load_settings() -> Result<Settings> {
    match settings_path() {
        Some(path) => load_from(&path),
        None => Ok(Settings::default()),
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    if let Some(path) = settings_path() {
        save_to(&path, settings)?;
    }
    Ok(())
}
