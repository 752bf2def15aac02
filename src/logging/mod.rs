// src/logging/mod.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One audited application event: signons, registrations,
/// administrative edits. Written as a JSON line per entry.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    pub username: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LogFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub level: Option<LogLevel>,
    pub component: Option<String>,
    pub search_term: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub struct Logger {
    log_dir: PathBuf,
    current_log_file: PathBuf,
    max_log_size: u64,
    max_log_files: usize,
}

impl Logger {
    pub fn new(log_dir: PathBuf) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        let current_log_file = log_dir.join("familytree.jsonl");

        if !current_log_file.exists() {
            File::create(&current_log_file)?;
        }

        Ok(Self {
            log_dir,
            current_log_file,
            max_log_size: 10 * 1024 * 1024, // 10 MB
            max_log_files: 5,
        })
    }

    /// Record an event. Also mirrored onto the process log.
    pub fn log(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        username: Option<&str>,
    ) -> Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            component: component.to_string(),
            message: message.to_string(),
            username: username.map(String::from),
        };

        match level {
            LogLevel::Debug => log::debug!("[{}] {}", component, message),
            LogLevel::Info => log::info!("[{}] {}", component, message),
            LogLevel::Warning => log::warn!("[{}] {}", component, message),
            LogLevel::Error => log::error!("[{}] {}", component, message),
        }

        self.check_rotation()?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.current_log_file)?;
        let line = serde_json::to_string(&entry)?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Read back events matching a filter, oldest first.
    pub fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let content = fs::read_to_string(&self.current_log_file)?;

        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .filter(|entry| Self::entry_matches_filter(entry, filter))
            .collect();

        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(usize::MAX);

        let start = offset.min(entries.len());
        let end = offset.saturating_add(limit).min(entries.len());
        entries = entries[start..end].to_vec();

        Ok(entries)
    }

    fn entry_matches_filter(entry: &LogEntry, filter: &LogFilter) -> bool {
        if let Some(start_date) = filter.start_date {
            if entry.timestamp < start_date {
                return false;
            }
        }

        if let Some(end_date) = filter.end_date {
            if entry.timestamp > end_date {
                return false;
            }
        }

        if let Some(level) = filter.level {
            if entry.level < level {
                return false;
            }
        }

        if let Some(component) = &filter.component {
            if !entry.component.contains(component) {
                return false;
            }
        }

        if let Some(term) = &filter.search_term {
            let in_user = entry
                .username
                .as_ref()
                .map_or(false, |name| name.contains(term));
            if !entry.message.contains(term) && !entry.component.contains(term) && !in_user {
                return false;
            }
        }

        true
    }

    fn check_rotation(&self) -> Result<()> {
        let metadata = fs::metadata(&self.current_log_file)?;

        if metadata.len() > self.max_log_size {
            self.rotate_logs()?;
        }

        Ok(())
    }

    fn rotate_logs(&self) -> Result<()> {
        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let rotated = self.log_dir.join(format!("familytree-{}.jsonl", timestamp));

        fs::rename(&self.current_log_file, &rotated)?;
        File::create(&self.current_log_file)?;

        self.cleanup_old_logs()?;

        Ok(())
    }

    // Keep only the most recent rotated files
    fn cleanup_old_logs(&self) -> Result<()> {
        let mut log_files = Vec::new();

        for entry in fs::read_dir(&self.log_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file()
                && path.extension().map_or(false, |ext| ext == "jsonl")
                && path != self.current_log_file
            {
                log_files.push(path);
            }
        }

        log_files.sort_by(|a, b| {
            let a_modified = fs::metadata(a)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            let b_modified = fs::metadata(b)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            b_modified.cmp(&a_modified)
        });

        if log_files.len() > self.max_log_files - 1 {
            for file in log_files.iter().skip(self.max_log_files - 1) {
                fs::remove_file(file)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_logger(tag: &str) -> Logger {
        let dir = std::env::temp_dir().join(format!("familytree-log-test-{}", tag));
        let _ = fs::remove_dir_all(&dir);
        Logger::new(dir).unwrap()
    }

    #[test]
    fn entries_roundtrip_through_the_file() {
        let logger = temp_logger("roundtrip");
        logger
            .log(LogLevel::Info, "Auth", "margaret signed on", Some("margaret"))
            .unwrap();
        logger
            .log(LogLevel::Warning, "Auth", "bad password", Some("duncan"))
            .unwrap();

        let entries = logger.get_logs(&LogFilter::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "margaret signed on");
        assert_eq!(entries[1].level, LogLevel::Warning);
    }

    #[test]
    fn level_filter_is_a_floor() {
        let logger = temp_logger("level");
        logger.log(LogLevel::Debug, "Db", "query", None).unwrap();
        logger.log(LogLevel::Error, "Db", "deadlock", None).unwrap();

        let filter = LogFilter {
            level: Some(LogLevel::Warning),
            ..Default::default()
        };
        let entries = logger.get_logs(&filter).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "deadlock");
    }

    #[test]
    fn search_and_paging() {
        let logger = temp_logger("search");
        for n in 0..5 {
            logger
                .log(LogLevel::Info, "Admin", &format!("edit {}", n), Some("webmaster"))
                .unwrap();
        }

        let filter = LogFilter {
            search_term: Some("edit".to_string()),
            offset: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let entries = logger.get_logs(&filter).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "edit 2");

        let filter = LogFilter {
            search_term: Some("no such".to_string()),
            ..Default::default()
        };
        assert!(logger.get_logs(&filter).unwrap().is_empty());
    }
}
