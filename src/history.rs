use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::HistoryError;
use crate::session::RoundSummary;

/// One finished round as stored in `history.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Local>,
    pub duration_secs: u32,
    pub wpm: u32,
    pub cpm: u32,
    pub accuracy: u8,
    pub typed_chars: usize,
}

impl HistoryEntry {
    pub fn from_summary(summary: &RoundSummary, date: DateTime<Local>) -> Self {
        Self {
            date,
            duration_secs: summary.duration_secs,
            wpm: summary.metrics.wpm,
            cpm: summary.metrics.cpm,
            accuracy: summary.metrics.accuracy,
            typed_chars: summary.typed_chars,
        }
    }
}

/// Append-only CSV log of finished rounds
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn open_default() -> Result<Self, HistoryError> {
        let dirs = ProjectDirs::from("", "", "typing-test").ok_or(HistoryError::NoDataDir)?;
        Ok(Self::with_path(dirs.data_local_dir().join("history.csv")))
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // header goes in once, when the file is created
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;

        debug!(path = %self.path.display(), wpm = entry.wpm, "round appended to history");
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let entries = reader.deserialize().collect::<Result<Vec<HistoryEntry>, _>>()?;
        Ok(entries)
    }

    pub fn best_wpm(&self) -> Result<Option<u32>, HistoryError> {
        Ok(self.read()?.iter().map(|e| e.wpm).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RoundMetrics;
    use tempfile::tempdir;

    fn summary(wpm: u32, accuracy: u8) -> RoundSummary {
        RoundSummary {
            metrics: RoundMetrics {
                wpm,
                cpm: wpm,
                accuracy,
            },
            duration_secs: 60,
            typed_chars: 42,
        }
    }

    #[test]
    fn empty_history() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("history.csv"));

        assert!(history.read().unwrap().is_empty());
        assert_eq!(history.best_wpm().unwrap(), None);
    }

    #[test]
    fn append_and_read_back() {
        let dir = tempdir().unwrap();
        let history = History::with_path(dir.path().join("state").join("history.csv"));
        let now = Local::now();

        history
            .append(&HistoryEntry::from_summary(&summary(12, 80), now))
            .unwrap();
        history
            .append(&HistoryEntry::from_summary(&summary(20, 95), now))
            .unwrap();

        let entries = history.read().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].wpm, 12);
        assert_eq!(entries[1].accuracy, 95);
        assert_eq!(entries[1].typed_chars, 42);
        assert_eq!(history.best_wpm().unwrap(), Some(20));
    }

    #[test]
    fn header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let history = History::with_path(&path);

        for wpm in 0..3 {
            history
                .append(&HistoryEntry::from_summary(&summary(wpm, 50), Local::now()))
                .unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("duration_secs").count(), 1);
        assert_eq!(contents.lines().count(), 4);
    }
}
