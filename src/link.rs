//! Symlink-farm reconciliation for the destination directory.

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs as unix_fs;
use std::path::Path;

use crate::classify::Selection;

/// Remove every existing entry from the destination directory.
///
/// The farm is rebuilt from scratch on every run so no stale link survives
/// a change in policy or in source contents. Any failure here is fatal.
fn clear_destination(dest: &Path) -> Result<()> {
    let entries = fs::read_dir(dest)
        .with_context(|| format!("failed to read destination directory {}", dest.display()))?;

    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", dest.display()))?;
        let path = entry.path();
        fs::remove_file(&path)
            .with_context(|| format!("failed to remove stale link {}", path.display()))?;
    }

    Ok(())
}

/// Rebuild the destination symlink farm from the selection.
///
/// After clearing, one link named `<tag>-<filename>` is created per
/// (tag, file) pair, pointing at the file's absolute path in the source
/// directory. An entry of that exact name already present is left alone.
/// A failed link creation aborts the run; links already created stay in
/// place and the next run repairs the farm. Returns the number of links
/// created.
pub fn rebuild_links(dest: &Path, source: &Path, selection: &Selection) -> Result<usize> {
    clear_destination(dest)?;

    let source = source
        .canonicalize()
        .with_context(|| format!("failed to resolve source directory {}", source.display()))?;

    let mut created = 0;
    for file in selection.files() {
        let target = source.join(&file.name);
        for tag in &file.tags {
            let link_path = dest.join(format!("{}-{}", tag, file.name));
            if fs::symlink_metadata(&link_path).is_ok() {
                continue;
            }
            unix_fs::symlink(&target, &link_path)
                .with_context(|| format!("failed to create link {}", link_path.display()))?;
            created += 1;
        }
    }

    Ok(created)
}
