//! Append-only feedback log.
//!
//! Rows are tab-separated and newline-terminated with four columns:
//! source_text, query, predicted_best_answer, user_preferred_answer. There is
//! no header. Fields are escaped so embedded tabs and newlines cannot break
//! row boundaries:
//!
//! | raw  | stored |
//! |------|--------|
//! | `\`  | `\\`   |
//! | tab  | `\t`   |
//! | LF   | `\n`   |
//! | CR   | `\r`   |

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use fs2::FileExt;
use tracing::{debug, instrument};

use crate::domain::FeedbackRecord;
use crate::error::QaError;

const COLUMNS: usize = 4;

/// Append one feedback row to the log at `path`.
///
/// The file is created if missing, but its parent directory must exist. The
/// whole row goes out in a single write while holding an exclusive lock; the
/// handle (and lock) is released when it drops, on success or failure.
#[instrument(skip(feedback), fields(path = %path.display()))]
pub fn record(path: &Path, feedback: &FeedbackRecord) -> Result<(), QaError> {
    let write_err = |source| QaError::FeedbackWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;

    file.lock_exclusive().map_err(write_err)?;

    let row = format_row(feedback);
    file.write_all(row.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    debug!(bytes = row.len(), "Feedback row appended");
    Ok(())
}

/// Read every row back from the log
pub fn read_log(path: &Path) -> anyhow::Result<Vec<FeedbackRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open feedback log: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read feedback log")?;
        if line.is_empty() {
            continue;
        }
        records.push(parse_row(&line, idx + 1)?);
    }

    Ok(records)
}

/// Serialize a record as one escaped, newline-terminated row
pub fn format_row(feedback: &FeedbackRecord) -> String {
    let fields = [
        escape_field(&feedback.source_text),
        escape_field(&feedback.query),
        escape_field(&feedback.predicted_best_answer),
        escape_field(&feedback.user_preferred_answer),
    ];
    format!("{}\n", fields.join("\t"))
}

fn parse_row(line: &str, line_no: usize) -> Result<FeedbackRecord, QaError> {
    let fields = line
        .split('\t')
        .map(|f| unescape_field(f, line_no))
        .collect::<Result<Vec<_>, _>>()?;

    let [source_text, query, predicted, preferred]: [String; COLUMNS] =
        fields.try_into().map_err(|fields: Vec<String>| QaError::MalformedLogRow {
            line: line_no,
            reason: format!("expected {} columns, found {}", COLUMNS, fields.len()),
        })?;

    Ok(FeedbackRecord::new(source_text, query, predicted, preferred))
}

fn escape_field(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn unescape_field(value: &str, line_no: usize) -> Result<String, QaError> {
    let mut output = String::with_capacity(value.len());
    let mut escaped = false;

    for ch in value.chars() {
        if escaped {
            match ch {
                '\\' => output.push('\\'),
                't' => output.push('\t'),
                'n' => output.push('\n'),
                'r' => output.push('\r'),
                other => {
                    return Err(QaError::MalformedLogRow {
                        line: line_no,
                        reason: format!("invalid escape sequence \\{}", other),
                    });
                }
            }
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            output.push(ch);
        }
    }

    if escaped {
        return Err(QaError::MalformedLogRow {
            line: line_no,
            reason: "unterminated escape sequence".to_string(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NOT_PROVIDED;
    use tempfile::TempDir;

    fn sample() -> FeedbackRecord {
        FeedbackRecord::new(
            "Rates rose 2%. The Fed is hawkish.",
            "Who raised rates?",
            "Rates rose 2%.",
            NOT_PROVIDED,
        )
    }

    #[test]
    fn test_row_format() {
        assert_eq!(
            format_row(&sample()),
            "Rates rose 2%. The Fed is hawkish.\tWho raised rates?\tRates rose 2%.\tNot Provided\n"
        );
    }

    #[test]
    fn test_escaping_keeps_one_line() {
        let record = FeedbackRecord::new("line one\nline\ttwo", "a\\b", "x\r\ny", NOT_PROVIDED);
        let row = format_row(&record);

        assert_eq!(row.matches('\n').count(), 1);
        assert_eq!(row.matches('\t').count(), 3);
        assert!(row.starts_with("line one\\nline\\ttwo\ta\\\\b\tx\\r\\ny\t"));
    }

    #[test]
    fn test_escape_round_trip() {
        let record = FeedbackRecord::new("tab\there", "back\\slash\\t", "new\nline", "\\");
        let row = format_row(&record);
        let parsed = parse_row(row.trim_end_matches('\n'), 1).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_appends_without_dedup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feedback.tsv");

        record(&path, &sample()).unwrap();
        record(&path, &sample()).unwrap();

        let records = read_log(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("no_such_dir").join("feedback.tsv");

        let result = record(&path, &sample());
        assert!(matches!(result, Err(QaError::FeedbackWrite { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_rows() {
        assert!(matches!(
            parse_row("only\ttwo", 3),
            Err(QaError::MalformedLogRow { line: 3, .. })
        ));
        assert!(matches!(
            parse_row("a\tb\tc\td\\", 1),
            Err(QaError::MalformedLogRow { .. })
        ));
        assert!(matches!(
            parse_row("a\\x\tb\tc\td", 1),
            Err(QaError::MalformedLogRow { .. })
        ));
    }
}
