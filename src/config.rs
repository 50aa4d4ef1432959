use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::catalog::{QuizFilter, SortBy};
use crate::error::ConfigError;
use crate::session::TIME_WARNING_SECS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// email of the user quizzes are taken as
    pub user_email: Option<String>,
    /// JSON catalog used instead of the bundled quizzes
    pub catalog_path: Option<PathBuf>,
    pub filter: QuizFilter,
    pub sort_by: SortBy,
    pub warning_secs: u32,
    /// tracing filter directive, `RUST_LOG` wins when set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_email: None,
            catalog_path: None,
            filter: QuizFilter::All,
            sort_by: SortBy::Date,
            warning_secs: TIME_WARNING_SECS,
            log_level: "info".to_string(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
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

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConfigStore {
    /// Like [`ConfigStore::load`] but reports a present yet unusable file instead of
    /// logging it, for callers that read the config before logging is up.
    pub fn try_load(&self) -> Result<Config, ConfigError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        self.try_load().unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            user_email: Some("teacher@neuropeak.com".into()),
            catalog_path: Some(PathBuf::from("/tmp/quizzes.json")),
            filter: QuizFilter::Completed,
            sort_by: SortBy::Course,
            warning_secs: 120,
            log_level: "debug".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_broken_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let missing = FileConfigStore::with_path(dir.path().join("none.json"));
        assert_eq!(missing.load(), Config::default());

        let broken_path = dir.path().join("broken.json");
        fs::write(&broken_path, b"[1, 2").unwrap();
        assert_eq!(FileConfigStore::with_path(&broken_path).load(), Config::default());
    }

    #[test]
    fn try_load_reports_broken_file() {
        let dir = tempdir().unwrap();
        let missing = FileConfigStore::with_path(dir.path().join("none.json"));
        assert_eq!(missing.try_load().unwrap(), Config::default());

        let broken_path = dir.path().join("broken.json");
        fs::write(&broken_path, b"{\"warning_secs\": \"soon\"}").unwrap();
        let err = FileConfigStore::with_path(&broken_path).try_load().unwrap_err();
        assert!(matches!(err, ConfigError::Serialize(_)));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"sort_by": "title"}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.sort_by, SortBy::Title);
        assert_eq!(cfg.warning_secs, 300);
        assert_eq!(cfg.log_level, "info");
    }
}
