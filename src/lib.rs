//! backup-rotator - Generational Backup Retention
//!
//! Given a flat directory of timestamped backup files, backup-rotator
//! decides which files to keep under a multi-tier retention policy (a fixed
//! count of most recent files plus daily/weekly/monthly/yearly
//! generations), exposes the kept set as a farm of tagged symlinks in a
//! destination directory, and deletes everything not selected.
//!
//! ## Pipeline
//!
//! scan → classify → relink → prune, strictly sequential, each stage
//! depending only on the previous one's output. No state survives a run.
//! The engine mutates both directories without locking, so callers must
//! serialize overlapping invocations against the same source/destination
//! pair.

pub mod classify;
pub mod link;
pub mod policy;
pub mod prune;
pub mod scan;

// Re-export commonly used items
pub use classify::{select, Selection};
pub use link::rebuild_links;
pub use policy::{RetentionPolicy, Tag};
pub use prune::{prune_source, PruneReport};
pub use scan::{scan_source, BackupFile, DEFAULT_SUFFIX, TIMESTAMP_FORMAT};
