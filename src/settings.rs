//! User preferences: which storage backend to use and where it lives.
//!
//! Stored as JSON at `~/.wtodo/config.json`. A missing file means the
//! defaults (flat data file in the same directory).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Use the SQLite backend instead of the flat data file.
    #[serde(default)]
    pub use_db: bool,
    /// Database location; defaults to `wtodo.db` next to the config file.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Settings {
    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join("config.json")
    }

    /// Load preferences, falling back to defaults if the file is missing or
    /// unreadable.
    pub fn load(dir: &Path) -> Self {
        let path = Self::config_path(dir);
        if !path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&path) {
            Ok(buf) => match serde_json::from_str(&buf) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Error parsing {}, using defaults: {e}", path.display());
                    Settings::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading {}, using defaults: {e}", path.display());
                Settings::default()
            }
        }
    }

    /// Save preferences using an atomic write (temp file + rename).
    pub fn save(&self, dir: &Path) -> std::io::Result<()> {
        let path = Self::config_path(dir);
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).expect("settings serialize");
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path());
        assert!(!settings.use_db);
        assert!(settings.db_path.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            use_db: true,
            db_path: Some(PathBuf::from("/tmp/custom.db")),
        };
        settings.save(dir.path()).unwrap();

        let loaded = Settings::load(dir.path());
        assert!(loaded.use_db);
        assert_eq!(loaded.db_path, Some(PathBuf::from("/tmp/custom.db")));
    }
}
