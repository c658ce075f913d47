use crate::models::phase::Phase;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable line of the extraction console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Local>,
    pub phase: Phase,
    pub message: String,
    pub severity: Severity,
    pub details: Option<String>,
}

impl LogEntry {
    /// `HH:MM:SS` of the entry, as the console shows it
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.time_label(), self.phase, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Append-only ledger of console lines
///
/// Ids start at 1 and keep increasing across `clear()`: the counter lives as
/// long as the ledger does.
#[derive(Debug, Clone, Default)]
pub struct LogLedger {
    entries: Vec<LogEntry>,
    last_id: u64,
}

impl LogLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current local time
    pub fn append(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        severity: Severity,
        details: Option<String>,
    ) -> &LogEntry {
        self.append_at(Local::now(), phase, message, severity, details)
    }

    /// Append an entry with an explicit timestamp
    pub fn append_at(
        &mut self,
        timestamp: DateTime<Local>,
        phase: Phase,
        message: impl Into<String>,
        severity: Severity,
        details: Option<String>,
    ) -> &LogEntry {
        self.last_id += 1;
        self.entries.push(LogEntry {
            id: self.last_id,
            timestamp,
            phase,
            message: message.into(),
            severity,
            details,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }
}
