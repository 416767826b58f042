// Append-only audit log of verdicts

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use pnlcheck_recon::verdict::{AuditRecord, Verdict, VerdictSink};

/// Text log with one `[timestamp] file | verdict` line per attempt.
///
/// The file and its parent directory are created on first append. Lines are
/// only ever appended. Concurrent writers to the same path must serialize
/// their calls; this type does no locking.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All well-formed records, oldest first. A missing file is an empty log.
    pub fn read_records(&self) -> io::Result<Vec<AuditRecord>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut records = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match AuditRecord::parse_line(&line) {
                Some(record) => records.push(record),
                None => {
                    log::warn!("{}:{}: skipping malformed audit line", self.path.display(), i + 1)
                }
            }
        }
        Ok(records)
    }

    pub fn summary(&self) -> io::Result<AuditSummary> {
        Ok(AuditSummary::from_records(&self.read_records()?))
    }
}

impl VerdictSink for AuditLog {
    fn append(&mut self, record: &AuditRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        // Single write so a line is never split across appends
        let line = format!("{}\n", record.to_line());
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    /// Most recent verdict per file name.
    pub latest: BTreeMap<String, Verdict>,
}

impl AuditSummary {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let mut summary = Self::default();
        for r in records {
            summary.total += 1;
            match r.verdict {
                Verdict::Correct => summary.correct += 1,
                Verdict::Wrong => summary.wrong += 1,
            }
            summary.latest.insert(r.file_name.clone(), r.verdict);
        }
        summary
    }

    /// Files whose latest verdict is `verdict`, sorted by name.
    pub fn files_with(&self, verdict: Verdict) -> Vec<&str> {
        self.latest
            .iter()
            .filter(|(_, v)| **v == verdict)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(day: u32, file: &str, verdict: Verdict) -> AuditRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        AuditRecord::new(ts, file, verdict)
    }

    #[test]
    fn test_append_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log/nested/validation_log.txt");
        let mut log = AuditLog::new(&path);

        log.append(&record(1, "a.xlsx", Verdict::Correct)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[2024-05-01 08:30:00] a.xlsx | correct\n");
    }

    #[test]
    fn test_append_never_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("validation_log.txt");
        fs::write(&path, "[2024-04-30 17:00:00] old.msg | wrong\n").unwrap();

        let mut log = AuditLog::new(&path);
        let r = record(1, "a.xlsx", Verdict::Correct);
        log.append(&r).unwrap();
        log.append(&r).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[2024-04-30 17:00:00] old.msg | wrong");
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn test_read_records_skips_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("validation_log.txt");
        fs::write(
            &path,
            "[2024-05-01 08:30:00] a.msg | correct\n\
             garbage line\n\
             \n\
             [2024-05-02 08:30:00] b.msg | wrong\n",
        )
        .unwrap();

        let records = AuditLog::new(&path).read_records().unwrap();
        assert_eq!(
            records,
            vec![record(1, "a.msg", Verdict::Correct), record(2, "b.msg", Verdict::Wrong)]
        );
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("none.txt"));
        assert!(log.read_records().unwrap().is_empty());
        assert_eq!(log.summary().unwrap(), AuditSummary::default());
    }

    #[test]
    fn test_summary_latest_verdict_wins() {
        let records = vec![
            record(1, "a.msg", Verdict::Wrong),
            record(2, "b.msg", Verdict::Correct),
            record(3, "a.msg", Verdict::Correct),
            record(3, "c.msg", Verdict::Wrong),
        ];
        let s = AuditSummary::from_records(&records);
        assert_eq!(s.total, 4);
        assert_eq!(s.correct, 2);
        assert_eq!(s.wrong, 2);
        assert_eq!(s.files_with(Verdict::Correct), vec!["a.msg", "b.msg"]);
        assert_eq!(s.files_with(Verdict::Wrong), vec!["c.msg"]);
    }
}
