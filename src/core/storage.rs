//! JSON persistence for high scores, lifetime statistics and launch settings.
//!
//! Files are read leniently: a missing or corrupt file yields defaults (and a
//! warning in the log) so a bad save never keeps anyone from playing. Writes go
//! through a temp file and a rename.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::StorageError;
use crate::core::game::{GameReport, RecordOutcome};
use crate::core::scoring::accuracy;
use crate::core::settings::Settings;

const SAVE_FILE: &str = "save.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_games: u32,
    pub total_score: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub best_accuracy: u32,
    pub play_time_secs: u64,
}

impl Stats {
    pub fn absorb(&mut self, report: &GameReport) {
        self.total_games += 1;
        self.total_score += report.score as u64;
        self.total_hits += report.hits as u64;
        self.total_misses += report.misses as u64;
        self.best_accuracy = self.best_accuracy.max(accuracy(report.hits, report.misses));
        self.play_time_secs += report.elapsed_secs as u64;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveFile {
    pub high_scores: BTreeMap<String, u32>,
    pub stats: Stats,
}

#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Storage under the platform's local data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let proj = ProjectDirs::from("dev", "letterterm", "letterterm").ok_or(StorageError::NoDataDir)?;
        Self::at(proj.data_local_dir())
    }

    pub fn at(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> SaveFile {
        read_or_default(&self.dir.join(SAVE_FILE))
    }

    pub fn high_score(&self, board: &str) -> u32 {
        self.load().high_scores.get(board).copied().unwrap_or(0)
    }

    /// Store `score` for `board` if it beats the current best. Returns whether
    /// it did; a lower or equal score never overwrites a stored one.
    pub fn save_high_score(&self, board: &str, score: u32) -> Result<bool, StorageError> {
        let mut save = self.load();
        let is_record = apply_high_score(&mut save, board, score);
        if is_record {
            self.write_save(&save)?;
        }
        Ok(is_record)
    }

    pub fn save_stats(&self, report: &GameReport) -> Result<Stats, StorageError> {
        let mut save = self.load();
        save.stats.absorb(report);
        self.write_save(&save)?;
        Ok(save.stats)
    }

    /// Fold a finished round into the stats and high-score table with a single write.
    pub fn record(&self, report: &GameReport) -> Result<RecordOutcome, StorageError> {
        let mut save = self.load();
        save.stats.absorb(report);
        let new_high_score = apply_high_score(&mut save, &report.board, report.score);
        self.write_save(&save)?;
        let best = save.high_scores.get(&report.board).copied().unwrap_or(0);
        debug!(board = %report.board, score = report.score, best, new_high_score, "recorded round");
        Ok(RecordOutcome { new_high_score, best })
    }

    /// Wipe high scores and stats. Settings are kept.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.write_save(&SaveFile::default())
    }

    pub fn load_settings(&self) -> Settings {
        read_or_default::<Settings>(&self.dir.join(SETTINGS_FILE)).normalized()
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        write_atomic(&self.dir.join(SETTINGS_FILE), settings)
    }

    fn write_save(&self, save: &SaveFile) -> Result<(), StorageError> {
        write_atomic(&self.dir.join(SAVE_FILE), save)
    }
}

fn apply_high_score(save: &mut SaveFile, board: &str, score: u32) -> bool {
    let is_record = match save.high_scores.get(board) {
        Some(current) => score > *current,
        None => true,
    };
    if is_record {
        save.high_scores.insert(board.to_string(), score);
    }
    is_record
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read file, using defaults");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed file");
            T::default()
        }
    }
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::json(path, e))?;
    fs::write(&tmp, data).map_err(|e| StorageError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))?;
    Ok(())
}
