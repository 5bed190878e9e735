//! Personal best persistence.
//!
//! A single record lives in one key-value [`ScoreSlot`]. Reading never fails
//! from the caller's point of view: a missing, unreadable or malformed slot is
//! "no record". Writing failures are logged and the new best is kept in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub wpm: u32,
    pub accuracy: u8,
    #[serde(rename = "recordedAt", alias = "date")]
    pub recorded_at: DateTime<Utc>,
}

/// Result of offering a finished trial to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub best: HighScore,
    pub is_new_best: bool,
}

/// One named key-value entry holding the serialized record.
pub trait ScoreSlot {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, value: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::high_score_path()
                .unwrap_or_else(|| PathBuf::from("typo_high_score.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, value)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-memory slot, with switches to simulate an unavailable backend
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: RefCell<Option<String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.value.replace(Some(value.into()));
        slot
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl ScoreSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        if self.fail_reads.get() {
            return Err(Error::Storage {
                message: "slot unavailable".into(),
            });
        }
        Ok(self.value.borrow().clone())
    }

    fn write(&self, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::Storage {
                message: "quota exceeded".into(),
            });
        }
        self.value.replace(Some(value.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::Storage {
                message: "slot unavailable".into(),
            });
        }
        self.value.replace(None);
        Ok(())
    }
}

#[derive(Debug)]
pub struct HighScoreStore<S: ScoreSlot = FileSlot> {
    slot: S,
    best: Option<HighScore>,
}

impl<S: ScoreSlot> HighScoreStore<S> {
    /// Wrap `slot` and prime the in-memory best from it.
    pub fn open(slot: S) -> Self {
        let mut store = Self { slot, best: None };
        store.load();
        store
    }

    /// Re-read the slot. Anything other than a well-formed record is `None`.
    pub fn load(&mut self) -> Option<HighScore> {
        self.best = self.read_record();
        self.best.clone()
    }

    fn read_record(&self) -> Option<HighScore> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "high score slot unreadable, treating as empty");
                return None;
            }
        };

        match serde_json::from_str::<HighScore>(&raw) {
            Ok(score) if score.accuracy <= 100 => Some(score),
            Ok(score) => {
                warn!(accuracy = score.accuracy, "high score accuracy out of range, ignoring");
                None
            }
            Err(e) => {
                warn!(error = %e, "malformed high score record, ignoring");
                None
            }
        }
    }

    pub fn best(&self) -> Option<&HighScore> {
        self.best.as_ref()
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn consider_and_save(&mut self, wpm: u32, accuracy: u8) -> ScoreOutcome {
        self.consider_and_save_at(wpm, accuracy, Utc::now())
    }

    /// Replace the best only on a strictly higher wpm (or when none exists).
    pub fn consider_and_save_at(
        &mut self,
        wpm: u32,
        accuracy: u8,
        at: DateTime<Utc>,
    ) -> ScoreOutcome {
        if let Some(best) = self.best.as_ref().filter(|best| wpm <= best.wpm) {
            return ScoreOutcome {
                best: best.clone(),
                is_new_best: false,
            };
        }

        let record = HighScore {
            wpm,
            accuracy: accuracy.min(100),
            recorded_at: at,
        };
        self.best = Some(record.clone());
        info!(wpm, accuracy = record.accuracy, "new high score");

        if let Err(e) = self.persist(&record) {
            warn!(error = %e, "could not save high score, keeping it in memory only");
        }

        ScoreOutcome {
            best: record,
            is_new_best: true,
        }
    }

    fn persist(&self, record: &HighScore) -> Result<()> {
        let data = serde_json::to_string(record)?;
        self.slot.write(&data)
    }

    /// Forget the stored best, both on disk and in memory.
    pub fn clear(&mut self) {
        self.best = None;
        if let Err(e) = self.slot.clear() {
            warn!(error = %e, "could not clear high score slot");
        }
    }
}
