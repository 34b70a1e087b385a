//! Audit log for fetch attempts.
//!
//! One entry is recorded per fetch attempt (failures by the provider itself,
//! successes by the dispatching service). Writing an entry is best-effort:
//! a sink that cannot persist an entry logs a warning and carries on, it never
//! fails the request that produced the entry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
    sync::Mutex,
};

/// Outcome of a single fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Fail,
}

/// A persisted record of one fetch attempt.
///
/// `id` and `timestamp` are assigned at write time, never by the caller.
/// `error` is present exactly when `status` is [`LogStatus::Fail`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLog {
    pub id: String,
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub status: LogStatus,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestLog {
    fn new(city: &str, status: LogStatus, source: &str, error: Option<String>) -> Self {
        // Successful attempts carry no error text, whatever the caller passed.
        let error = match status {
            LogStatus::Fail => error,
            LogStatus::Success => None,
        };

        Self {
            id: new_entry_id(),
            city: city.to_string(),
            timestamp: Utc::now(),
            status,
            source: source.to_string(),
            error,
        }
    }
}

/// 32-character hex id, unique per entry.
fn new_entry_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Destination for audit entries.
///
/// Implementations must not propagate their own failures; a lost entry is
/// logged and forgotten.
#[async_trait]
pub trait AuditSink: Send + Sync + Debug {
    async fn save_log(&self, city: &str, status: LogStatus, source: &str, error: Option<String>);
}

/// Appends one JSON line per entry to a file on disk.
#[derive(Debug)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn append(&self, entry: &RequestLog) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")?;

        Ok(())
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn save_log(&self, city: &str, status: LogStatus, source: &str, error: Option<String>) {
        let entry = RequestLog::new(city, status, source, error);

        if let Err(err) = self.append(&entry) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to persist audit log entry"
            );
        }
    }
}

/// Records entries in memory; the substitutable stub for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<RequestLog>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<RequestLog> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn save_log(&self, city: &str, status: LogStatus, source: &str, error: Option<String>) {
        let entry = RequestLog::new(city, status, source, error);

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// Discards every entry.
#[derive(Debug, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn save_log(&self, _city: &str, _status: LogStatus, _source: &str, _error: Option<String>) {}
}
