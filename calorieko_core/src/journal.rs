//! Append-only activity journal.
//!
//! Logged meals and workouts are appended to a JSONL (JSON Lines) file
//! under an exclusive lock so concurrent writers never interleave lines.

use crate::{ActivityLogEntry, LoggedActivity, Result};
use chrono::{NaiveDate, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for logged activities
pub trait JournalSink {
    fn append(&mut self, record: &LoggedActivity) -> Result<()>;

    /// Stamp an entry with the current time and append it
    fn log_now(&mut self, entry: ActivityLogEntry) -> Result<LoggedActivity> {
        let record = LoggedActivity {
            logged_at: Utc::now(),
            entry,
        };
        self.append(&record)?;
        Ok(record)
    }
}

/// JSONL-backed journal with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl JournalSink for JsonlJournal {
    fn append(&mut self, record: &LoggedActivity) -> Result<()> {
        record.entry.validate()?;
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        // Serialize first so a failure never leaves half a line
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!(
            "Appended {:?} '{}' to journal",
            record.entry.kind,
            record.entry.name
        );
        Ok(())
    }
}

/// Read every record from a journal file
///
/// A missing file is an empty journal. Lines that are not valid UTF-8 JSON,
/// or whose entry is out of bounds, are skipped with a warning.
pub fn read_journal(path: &Path) -> Result<Vec<LoggedActivity>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    // Split on raw bytes so a torn or binary line cannot fail the whole read
    for (line_num, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<LoggedActivity>(&line) {
            Ok(record) => match record.entry.validate() {
                Ok(()) => records.push(record),
                Err(e) => tracing::warn!("Skipping journal line {}: {}", line_num + 1, e),
            },
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from journal", records.len());
    Ok(records)
}

/// Entries logged on a given UTC date, in journal order
pub fn entries_on(records: &[LoggedActivity], date: NaiveDate) -> Vec<ActivityLogEntry> {
    records
        .iter()
        .filter(|r| r.logged_at.date_naive() == date)
        .map(|r| r.entry.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn meal() -> ActivityLogEntry {
        ActivityLogEntry::meal("12:30 PM", "Sinigang na Baboy", 420, 1100, "1 bowl")
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("journal").join("activity.jsonl");

        let mut journal = JsonlJournal::new(&path);
        let record = journal.log_now(meal()).unwrap();

        let records = read_journal(&path).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_append_multiple_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let mut journal = JsonlJournal::new(&path);
        for _ in 0..5 {
            journal.log_now(meal()).unwrap();
        }

        assert_eq!(read_journal(&path).unwrap().len(), 5);
    }

    #[test]
    fn test_read_missing_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let records = read_journal(&temp_dir.path().join("missing.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let mut journal = JsonlJournal::new(&path);
        journal.log_now(meal()).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{\"logged_at\": 42").unwrap();
        writeln!(file).unwrap();
        drop(file);

        journal.log_now(meal()).unwrap();

        assert_eq!(read_journal(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let mut journal = JsonlJournal::new(&path);
        journal.log_now(meal()).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xff, 0xfe, b'{', b'\n']).unwrap();
        drop(file);

        journal.log_now(meal()).unwrap();

        let records = read_journal(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.entry == meal()));
    }

    #[test]
    fn test_out_of_range_entries_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let mut journal = JsonlJournal::new(&path);
        let huge = ActivityLogEntry::meal("08:00 AM", "Lechon", i32::MAX, 0, "");
        assert!(journal.log_now(huge.clone()).is_err());
        assert!(!path.exists());

        // A hand-edited line with the same values is skipped on read
        journal.log_now(meal()).unwrap();
        let forged = LoggedActivity {
            logged_at: Utc::now(),
            entry: huge,
        };
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{}", serde_json::to_string(&forged).unwrap()).unwrap();
        drop(file);

        assert_eq!(read_journal(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_entries_on_date() {
        let today = Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap();
        let records = vec![
            LoggedActivity {
                logged_at: today,
                entry: meal(),
            },
            LoggedActivity {
                logged_at: today - Duration::days(1),
                entry: meal(),
            },
        ];

        assert_eq!(entries_on(&records, today.date_naive()).len(), 1);
    }
}
