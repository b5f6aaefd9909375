//! Append-only event log kept as one text file per calendar day
//!
//! ## Layout
//!
//! ```text
//! <log_dir>/log_2024-01-01.log
//! <log_dir>/log_2024-01-02.log
//! ```
//!
//! Each line is `[<YYYY-MM-DD HH:MM:SS>] <message>`. The files are the only
//! history the watchdog keeps; the summary re-reads them on every run.
//!
//! ## Retention
//!
//! `prune` removes daily files whose last modification is older than the
//! retention window. It runs once per cycle, before anything is written.

pub mod event;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error, info, instrument, warn};

use crate::clock::Clock;
use crate::error::EventLogResult;

pub use event::{Entry, EventStatus, LogEvent, Tally};

const FILE_PREFIX: &str = "log_";
const FILE_SUFFIX: &str = ".log";

const SECONDS_PER_DAY: u64 = 86_400;

/// Handle to the directory of daily log files.
///
/// Cloning is cheap; all clones write to the same directory.
#[derive(Clone)]
pub struct EventLog {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").field("dir", &self.dir).finish()
    }
}

impl EventLog {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Path of the file holding the given day's lines.
    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format("%Y-%m-%d")))
    }

    /// Append a message stamped with the current time.
    pub fn append(&self, message: &str) -> EventLogResult<()> {
        self.append_at(self.clock.now(), message)
    }

    /// Append a message stamped with `timestamp`, into that day's file.
    pub fn append_at(&self, timestamp: NaiveDateTime, message: &str) -> EventLogResult<()> {
        fs::create_dir_all(&self.dir)?;

        let line = event::render_line(timestamp, message);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(timestamp.date()))?;
        writeln!(file, "{line}")?;

        info!("{line}");
        Ok(())
    }

    /// Record an entry, logging instead of failing when the file is not
    /// writable.
    pub fn record(&self, entry: &Entry) {
        if let Err(e) = self.append(&entry.to_string()) {
            error!("could not write event log entry ({entry:?}): {e}");
        }
    }

    /// All daily files currently present, oldest date first.
    pub fn files(&self) -> EventLogResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut files = vec![];
        for entry in entries {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX));
            if is_log && path.is_file() {
                files.push(path);
            }
        }

        // names embed the date, so lexical order is chronological
        files.sort();
        Ok(files)
    }

    /// Delete daily files last modified more than `max_age_days` ago.
    ///
    /// A file that cannot be inspected or removed is skipped; the rest are
    /// still pruned. Returns the removed paths.
    #[instrument(skip(self))]
    pub fn prune(&self, max_age_days: u32) -> EventLogResult<Vec<PathBuf>> {
        let max_age = Duration::from_secs(u64::from(max_age_days) * SECONDS_PER_DAY);
        Ok(self.prune_files(self.files()?, max_age))
    }

    fn prune_files(&self, paths: Vec<PathBuf>, max_age: Duration) -> Vec<PathBuf> {
        let now = SystemTime::now();

        let mut removed = vec![];
        for path in paths {
            let modified = match fs::metadata(&path).and_then(|meta| meta.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("cannot read age of {}: {e}", path.display());
                    continue;
                }
            };
            // a modification time in the future is never stale
            let Ok(age) = now.duration_since(modified) else {
                continue;
            };
            if age <= max_age {
                continue;
            }

            if let Err(e) = fs::remove_file(&path) {
                warn!("cannot remove {}: {e}", path.display());
                continue;
            }
            debug!("removed {} (age {}s)", path.display(), age.as_secs());
            self.record(&Entry::LogPruned {
                file: path.display().to_string(),
            });
            removed.push(path);
        }

        removed
    }

    /// Parse every line of every daily file and keep those stamped within
    /// `[start, end]`, in file then line order. Unparsable lines are skipped.
    pub fn read_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EventLogResult<Vec<LogEvent>> {
        let mut events = vec![];
        let mut skipped = 0usize;

        for path in self.files()? {
            let bytes = fs::read(&path)?;
            let content = String::from_utf8_lossy(&bytes);

            for line in content.lines() {
                match LogEvent::parse(line) {
                    Some(event) if event.timestamp >= start && event.timestamp <= end => {
                        events.push(event)
                    }
                    Some(_) => {}
                    None => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            warn!("skipped {skipped} unparsable log lines");
        }

        Ok(events)
    }
}
