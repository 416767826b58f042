//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; batch scripts branch on them.
//!
//! | Code | Meaning                                                |
//! |------|--------------------------------------------------------|
//! | 0    | Success; for `validate`, the verdict was "correct"     |
//! | 1    | `validate` verdict was "wrong" (recorded in the log)   |
//! | 2    | Usage error (bad arguments)                            |
//! | 3    | I/O error outside validation (config or log unreadable) |
//! | 4    | Config file failed to parse or validate                |
//! | 5    | Audit log could not be written; no verdict recorded    |
//!
//! A "wrong" verdict caused by unreadable inputs still exits 1: the failure
//! was recorded like any other mismatch. Only code 5 means the log is
//! missing a line for the attempt.

/// Success - command completed; verdict "correct".
pub const EXIT_SUCCESS: u8 = 0;

/// Verdict "wrong". Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_WRONG: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read a config file or audit log.
pub const EXIT_IO: u8 = 3;

/// Config file is not valid TOML or fails validation.
pub const EXIT_CONFIG: u8 = 4;

/// Appending the verdict to the audit log failed.
pub const EXIT_AUDIT_WRITE: u8 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_WRONG, EXIT_USAGE, EXIT_IO, EXIT_CONFIG, EXIT_AUDIT_WRITE];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_clap_usage_code_matches() {
        // clap exits 2 on argument errors; keep the registry in line with it
        assert_eq!(EXIT_USAGE, 2);
    }
}
