// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only interaction log.
//!
//! Every resolved exchange is recorded as one CSV row. A mutex guards the
//! whole exists-check/open/write sequence so concurrent callers never
//! interleave or lose rows; the header is written only when the file is
//! first created.

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::LogWriteError;

/// One logged exchange.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRecord {
    pub timestamp: String,
    pub user_message: String,
    pub bot_response: String,
    pub confidence: f32,
}

const HEADER: [&str; 4] = ["timestamp", "user_message", "bot_response", "confidence"];

/// Thread-safe append cursor over the interaction log file.
pub struct InteractionLogger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl InteractionLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record stamped with the current UTC time.
    ///
    /// The guard drops on every exit path, so a failed write never leaves
    /// the cursor locked; a poisoned lock is recovered rather than
    /// propagated.
    pub fn record(
        &self,
        user_message: &str,
        bot_response: &str,
        confidence: f32,
    ) -> Result<(), LogWriteError> {
        let record = InteractionRecord {
            timestamp: Utc::now().to_rfc3339(),
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            confidence,
        };

        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.append(&record).map_err(|source| LogWriteError {
            path: self.path.clone(),
            source,
        })
    }

    fn append(&self, record: &InteractionRecord) -> anyhow::Result<()> {
        let exists = self.path.exists();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !exists {
            writer
                .write_record(HEADER)
                .context("Failed to write log header")?;
        }
        writer
            .serialize(record)
            .context("Failed to write log record")?;
        writer.flush().context("Failed to flush log")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn read_rows(path: &Path) -> (csv::StringRecord, Vec<csv::StringRecord>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().clone();
        let rows = reader.records().map(|r| r.unwrap()).collect();
        (header, rows)
    }

    #[test]
    fn header_written_once() {
        let dir = TempDir::new().unwrap();
        let logger = InteractionLogger::new(dir.path().join("interactions.csv"));

        logger.record("hi", "hello!", 1.0).unwrap();
        logger.record("menu", "🍽 ...", 1.0).unwrap();

        let (header, rows) = read_rows(logger.path());
        assert_eq!(
            header,
            csv::StringRecord::from(vec![
                "timestamp",
                "user_message",
                "bot_response",
                "confidence"
            ])
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "hi");
        assert_eq!(&rows[1][1], "menu");
    }

    #[test]
    fn fields_with_commas_and_newlines_survive() {
        let dir = TempDir::new().unwrap();
        let logger = InteractionLogger::new(dir.path().join("interactions.csv"));

        logger
            .record("hours, please", "⏰ open 9 AM, close 11 PM", 1.0)
            .unwrap();

        let (_, rows) = read_rows(logger.path());
        assert_eq!(&rows[0][1], "hours, please");
        assert_eq!(&rows[0][2], "⏰ open 9 AM, close 11 PM");
    }

    #[test]
    fn creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let logger = InteractionLogger::new(dir.path().join("nested").join("log.csv"));
        logger.record("hi", "hello", 1.0).unwrap();
        assert!(logger.path().exists());
    }

    #[test]
    fn concurrent_records_never_interleave() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(InteractionLogger::new(dir.path().join("interactions.csv")));

        let threads = 8;
        let per_thread = 5;
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        logger
                            .record(&format!("q-{}-{}", t, i), "answer", 0.5)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let (_, rows) = read_rows(logger.path());
        assert_eq!(rows.len(), threads * per_thread);
        for row in &rows {
            assert_eq!(row.len(), 4);
            assert!(row[0].contains('T'), "timestamp must be RFC 3339");
            assert_eq!(&row[2], "answer");
        }
    }
}
