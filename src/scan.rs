//! Source-directory scanning and timestamp extraction.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::policy::Tag;

/// Timestamp layout embedded in backup filenames.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Default filename suffix expected immediately after the timestamp.
pub const DEFAULT_SUFFIX: &str = ".sql.gz";

/// A backup file found in the source directory.
///
/// Identity is the filename; the extracted timestamp is the source of truth
/// for all bucketing decisions.
#[derive(Debug, Clone)]
pub struct BackupFile {
    pub name: String,
    pub timestamp: NaiveDateTime,
    /// Retention tags accumulated during classification.
    pub tags: BTreeSet<Tag>,
}

/// Build the matcher for names carrying a timestamp followed by `suffix`.
fn timestamp_pattern(suffix: &str) -> Result<Regex> {
    let pattern = format!(
        r"(\d{{4}}-\d{{2}}-\d{{2}}T\d{{2}}-\d{{2}}-\d{{2}}){}",
        regex::escape(suffix)
    );
    Regex::new(&pattern).with_context(|| format!("invalid filename pattern for suffix {:?}", suffix))
}

/// List `dir` and produce a `BackupFile` for every entry whose name matches
/// the timestamp pattern.
///
/// Names that do not match are not backup artifacts and are silently
/// ignored. Names that match but carry an impossible timestamp (month 13,
/// hour 25, ...) are reported on stderr and skipped. The result is ordered
/// newest-first; ties on identical timestamps are broken by filename so the
/// ordering is total and runs are deterministic.
pub fn scan_source(dir: &Path, suffix: &str) -> Result<Vec<BackupFile>> {
    let re = timestamp_pattern(suffix)?;

    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read source directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("Warning: failed to read entry in {}: {}", dir.display(), err);
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(captures) = re.captures(&name) else {
            continue;
        };

        let stamp = &captures[1];
        match NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
            Ok(timestamp) => files.push(BackupFile {
                name,
                timestamp,
                tags: BTreeSet::new(),
            }),
            Err(err) => {
                eprintln!("Warning: skipping {}: unparsable timestamp {:?}: {}", name, stamp, err);
            }
        }
    }

    files.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.name.cmp(&a.name))
    });

    Ok(files)
}
