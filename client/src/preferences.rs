use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const PROFILE_FILE_NAME: &str = "birdie-campus-profile.json";
const STORAGE_VERSION: u32 = 1;

/// Local state retained between runs. Only the identity token matters for
/// gameplay; everything else lives in the profile store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Preferences {
    version: u32,
    pub identity_token: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            identity_token: None,
        }
    }
}

fn storage_path() -> PathBuf {
    match std::env::var("CAMPUS_PROFILE_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir).join(PROFILE_FILE_NAME),
        _ => PathBuf::from(PROFILE_FILE_NAME),
    }
}

impl Preferences {
    /// Loads saved preferences, falling back to defaults on any error. A
    /// corrupt file is not fatal; it just means logging in again.
    pub fn load() -> Self {
        let path = storage_path();
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Preferences>(&raw) {
                Ok(prefs) if prefs.version == STORAGE_VERSION => prefs,
                Ok(_) => {
                    log::warn!("preferences version mismatch; starting fresh");
                    Self::default()
                }
                Err(e) => {
                    log::warn!("failed to parse {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let path = storage_path();
        match serde_json::to_string_pretty(self) {
            Ok(raw) => {
                if let Err(e) = fs::write(&path, raw) {
                    log::warn!("failed to write {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("failed to serialize preferences: {e}"),
        }
    }
}
