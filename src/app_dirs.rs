use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/typo`, falling back to the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("typo"))
        } else {
            ProjectDirs::from("", "", "typo").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn high_score_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("high_score.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("typo.log"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typo").map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }
}
