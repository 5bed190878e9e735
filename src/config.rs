use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::corpus::DEFAULT_CORPUS;
use crate::trial::DEFAULT_WORD_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub corpus: String,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_WORD_COUNT,
            corpus: DEFAULT_CORPUS.to_string(),
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Zero words never completes and a zero tick spins the event loop
    pub fn sanitized(mut self) -> Self {
        if self.number_of_words == 0 {
            warn!("number_of_words must be at least 1, using {DEFAULT_WORD_COUNT}");
            self.number_of_words = DEFAULT_WORD_COUNT;
        }
        if self.tick_rate_ms == 0 {
            warn!("tick_rate_ms must be at least 1, using 100");
            self.tick_rate_ms = Config::default().tick_rate_ms;
        }
        self
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
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typo_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Load, writing the defaults first when no file exists yet so there is
    /// something to edit.
    pub fn load_or_init(&self) -> Config {
        if !self.path.exists() {
            match self.save(&Config::default()) {
                Ok(()) => debug!(path = %self.path.display(), "wrote default config"),
                Err(e) => debug!(error = %e, path = %self.path.display(), "could not write default config"),
            }
        }
        self.load()
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let cfg = match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                debug!(error = %e, path = %self.path.display(), "unreadable config, using defaults");
                Config::default()
            }),
            Err(_) => Config::default(),
        };
        cfg.sanitized()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
