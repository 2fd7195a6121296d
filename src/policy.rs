//! Retention policy configuration and tier tags.

use std::fmt;

/// Reason a backup file is retained. A file can carry several at once,
/// e.g. the newest file of a week is usually also the newest of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Keep,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Tag {
    /// Stable string form used in link names and the run report.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Keep => "keep",
            Tag::Daily => "daily",
            Tag::Weekly => "weekly",
            Tag::Monthly => "monthly",
            Tag::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable retention configuration.
///
/// `keep` retains the newest files unconditionally; the four quotas bound
/// how many daily/weekly/monthly/yearly generations survive after that.
/// A quota of zero disables its tier.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub keep: usize,
    pub days: usize,
    pub weeks: usize,
    pub months: usize,
    pub years: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            keep: 5,
            days: 7,
            weeks: 5,
            months: 6,
            years: 2,
        }
    }
}
