use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Service-account key file looked up in the working directory by default.
pub const DEFAULT_CREDENTIALS_FILE: &str = "google_credentials.json";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    #[default]
    Google,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub credentials_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub last_learner: Option<String>,
}

/// Command-line values that take precedence over the stored config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<Backend>,
    pub credentials_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub learner: Option<String>,
}

/// Fully resolved settings the app runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: Backend,
    pub credentials_path: PathBuf,
    pub data_dir: PathBuf,
    pub learner: Option<String>,
}

impl Config {
    pub fn resolve(&self, overrides: Overrides) -> Settings {
        Settings {
            backend: overrides.backend.unwrap_or(self.backend),
            credentials_path: overrides
                .credentials_path
                .or_else(|| self.credentials_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
            data_dir: overrides
                .data_dir
                .or_else(|| self.data_dir.clone())
                .unwrap_or_else(AppDirs::data_dir),
            learner: overrides
                .learner
                .or_else(|| self.last_learner.clone())
                .filter(|l| !l.trim().is_empty()),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            backend: Backend::Csv,
            credentials_path: Some(PathBuf::from("/etc/abatrack/key.json")),
            data_dir: Some(PathBuf::from("/srv/sheets")),
            last_learner: Some("Sam".into()),
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn corrupt_or_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());

        fs::write(&path, br#"{"backend": "csv"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.backend, Backend::Csv);
        assert_eq!(cfg.last_learner, None);
    }

    #[test]
    fn overrides_win_over_config() {
        let cfg = Config {
            backend: Backend::Google,
            credentials_path: Some(PathBuf::from("stored.json")),
            data_dir: Some(PathBuf::from("stored")),
            last_learner: Some("Sam".into()),
        };
        let settings = cfg.resolve(Overrides {
            backend: Some(Backend::Csv),
            credentials_path: None,
            data_dir: Some(PathBuf::from("cli")),
            learner: Some("Alex".into()),
        });
        assert_eq!(settings.backend, Backend::Csv);
        assert_eq!(settings.credentials_path, PathBuf::from("stored.json"));
        assert_eq!(settings.data_dir, PathBuf::from("cli"));
        assert_eq!(settings.learner.as_deref(), Some("Alex"));
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = Config::default().resolve(Overrides::default());
        assert_eq!(settings.backend, Backend::Google);
        assert_eq!(
            settings.credentials_path,
            PathBuf::from(DEFAULT_CREDENTIALS_FILE)
        );
        assert_eq!(settings.learner, None);
    }

    #[test]
    fn backend_display() {
        assert_eq!(Backend::Google.to_string(), "google");
        assert_eq!(Backend::Csv.to_string(), "csv");
    }
}
