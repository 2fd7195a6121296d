//! Source-directory enforcement of the retention decision.

use std::fs;
use std::path::Path;

use crate::classify::Selection;
use crate::scan::BackupFile;

/// Outcome of a prune pass.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: usize,
    pub reclaimed_bytes: u64,
}

/// Delete every scanned file absent from the selection.
///
/// Deletion is best-effort: a per-file failure is reported on stderr and
/// the remaining candidates are still processed. In dry-run mode the
/// intended removals are printed and the source directory is left
/// untouched. Files whose names never matched the backup pattern were not
/// scanned in and are never candidates here.
pub fn prune_source(
    source: &Path,
    found: &[BackupFile],
    selection: &Selection,
    dry_run: bool,
) -> PruneReport {
    let mut report = PruneReport::default();

    for file in found {
        if selection.is_selected(&file.name) {
            continue;
        }

        let path = source.join(&file.name);
        if dry_run {
            println!("Would remove: {}", path.display());
            continue;
        }

        let size = fs::symlink_metadata(&path).map(|m| m.len()).unwrap_or(0);
        match fs::remove_file(&path) {
            Ok(()) => {
                report.removed += 1;
                report.reclaimed_bytes += size;
            }
            Err(err) => {
                eprintln!("Error removing {}: {}. Skipping.", path.display(), err);
            }
        }
    }

    report
}
