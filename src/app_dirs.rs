use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "quizline") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quizline_config.json")
        }
    }

    pub fn log_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("quizline")
        } else if let Some(pd) = ProjectDirs::from("", "", "quizline") {
            pd.data_local_dir().join("logs")
        } else {
            PathBuf::from("logs")
        }
    }
}
