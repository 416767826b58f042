//! Verdicts and the audit records that persist them.

use std::fmt;
use std::io;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Wrong,
}

impl Verdict {
    /// An indeterminate match (`None`) is a wrong verdict.
    pub fn from_match(matched: Option<bool>) -> Self {
        match matched {
            Some(true) => Self::Correct,
            Some(false) | None => Self::Wrong,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Wrong => "wrong",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "correct" => Some(Self::Correct),
            "wrong" => Some(Self::Wrong),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub timestamp: NaiveDateTime,
    pub file_name: String,
    pub verdict: Verdict,
}

impl AuditRecord {
    pub fn new(timestamp: NaiveDateTime, file_name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            // The line format carries whole seconds only.
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            file_name: single_line(file_name.into()),
            verdict,
        }
    }

    /// Record stamped with the local wall clock.
    pub fn now(file_name: impl Into<String>, matched: Option<bool>) -> Self {
        Self::new(Local::now().naive_local(), file_name, Verdict::from_match(matched))
    }

    /// `[YYYY-MM-DD HH:MM:SS] <file_name> | correct|wrong`, without newline.
    pub fn to_line(&self) -> String {
        format!(
            "[{}] {} | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.file_name,
            self.verdict
        )
    }

    /// Inverse of [`AuditRecord::to_line`]. Returns `None` for malformed lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim_end_matches(['\r', '\n']).strip_prefix('[')?;
        let (stamp, rest) = rest.split_once("] ")?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        let (file_name, verdict) = rest.rsplit_once(" | ")?;
        let verdict = Verdict::parse(verdict.trim())?;
        if file_name.is_empty() {
            return None;
        }
        Some(Self::new(timestamp, file_name, verdict))
    }
}

/// Control characters (newlines included) become spaces so a record is
/// always exactly one log line.
fn single_line(name: String) -> String {
    if name.chars().any(char::is_control) {
        name.chars().map(|c| if c.is_control() { ' ' } else { c }).collect()
    } else {
        name
    }
}

// ---------------------------------------------------------------------------
// Recorder collaborator
// ---------------------------------------------------------------------------

/// Append-only destination for audit records.
///
/// Implementations must never rewrite or drop earlier records. Errors are
/// returned to the caller unchanged: a lost audit record is fatal.
pub trait VerdictSink {
    fn append(&mut self, record: &AuditRecord) -> io::Result<()>;
}

impl<S: VerdictSink + ?Sized> VerdictSink for &mut S {
    fn append(&mut self, record: &AuditRecord) -> io::Result<()> {
        (**self).append(record)
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<AuditRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(AuditRecord::to_line).collect()
    }
}

impl VerdictSink for MemorySink {
    fn append(&mut self, record: &AuditRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Build a record for `file_name` and append it to `sink`.
pub fn record_verdict(
    sink: &mut dyn VerdictSink,
    file_name: &str,
    matched: Option<bool>,
) -> io::Result<AuditRecord> {
    let record = AuditRecord::now(file_name, matched);
    sink.append(&record)?;
    Ok(record)
}
