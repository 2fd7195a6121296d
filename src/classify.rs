//! Tiered retention selection (grandfather-father-son).

use std::collections::{BTreeSet, HashSet};

use chrono::Datelike;

use crate::policy::{RetentionPolicy, Tag};
use crate::scan::BackupFile;

/// Files chosen for retention, newest-first, one entry per filename.
///
/// A file qualifying for several tiers appears once and carries the union
/// of its tags, so it contributes exactly one linking/pruning decision.
#[derive(Debug, Default)]
pub struct Selection {
    files: Vec<BackupFile>,
    names: HashSet<String>,
}

impl Selection {
    fn push(&mut self, file: BackupFile) {
        if self.names.insert(file.name.clone()) {
            self.files.push(file);
        } else if let Some(existing) = self.files.iter_mut().find(|f| f.name == file.name) {
            existing.tags.extend(file.tags);
        }
    }

    pub fn files(&self) -> &[BackupFile] {
        &self.files
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Occupied bucket keys for one tier, bounded by the tier's quota.
struct TierBuckets {
    quota: usize,
    occupied: HashSet<String>,
}

impl TierBuckets {
    fn new(quota: usize) -> Self {
        Self {
            quota,
            occupied: HashSet::new(),
        }
    }

    /// Claim `key` if it is unoccupied and the quota is not exhausted.
    /// With newest-first input, the claimant is always the newest member
    /// of its bucket.
    fn claim(&mut self, key: String) -> bool {
        if self.occupied.len() >= self.quota || self.occupied.contains(&key) {
            return false;
        }
        self.occupied.insert(key);
        true
    }
}

/// Apply `policy` to a newest-first file list and produce the selection.
///
/// The first `keep` files (clamped to what is available) are tagged `keep`
/// unconditionally. The remainder is scanned once, newest-first; for each
/// tier independently, a file becomes the representative of its calendar
/// bucket when that bucket is fresh and the tier still has quota. Tags are
/// additive: one file can represent its day, week, month, and year at once.
pub fn select(files: &[BackupFile], policy: &RetentionPolicy) -> Selection {
    let mut selection = Selection::default();

    let head = policy.keep.min(files.len());
    for file in &files[..head] {
        let mut kept = file.clone();
        kept.tags.insert(Tag::Keep);
        selection.push(kept);
    }

    let mut daily = TierBuckets::new(policy.days);
    let mut weekly = TierBuckets::new(policy.weeks);
    let mut monthly = TierBuckets::new(policy.months);
    let mut yearly = TierBuckets::new(policy.years);

    for file in &files[head..] {
        let date = file.timestamp.date();
        let mut tags = BTreeSet::new();

        if daily.claim(date.format("%Y-%m-%d").to_string()) {
            tags.insert(Tag::Daily);
        }

        // ISO week paired with the ISO week-year, so a backup from early
        // January can land in the last week of the previous week-year.
        let week = date.iso_week();
        if weekly.claim(format!("{}-W{:02}", week.year(), week.week())) {
            tags.insert(Tag::Weekly);
        }

        if monthly.claim(date.format("%Y-%m").to_string()) {
            tags.insert(Tag::Monthly);
        }

        if yearly.claim(date.format("%Y").to_string()) {
            tags.insert(Tag::Yearly);
        }

        if !tags.is_empty() {
            let mut kept = file.clone();
            kept.tags = tags;
            selection.push(kept);
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;

    fn file(name: &str, stamp: &str) -> BackupFile {
        BackupFile {
            name: name.to_string(),
            timestamp: NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).unwrap(),
            tags: BTreeSet::new(),
        }
    }

    /// One file per day for `days` days, newest first, starting at `start`
    /// (a YYYY-MM-DD date) and walking backwards.
    fn daily_files(start: &str, days: u32) -> Vec<BackupFile> {
        let start = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        (0..days)
            .map(|i| {
                let date = start - chrono::Duration::days(i64::from(i));
                file(
                    &format!("db-{}T03-00-00.sql.gz", date.format("%Y-%m-%d")),
                    &format!("{}T03-00-00", date.format("%Y-%m-%d")),
                )
            })
            .collect()
    }

    fn policy(keep: usize, days: usize, weeks: usize, months: usize, years: usize) -> RetentionPolicy {
        RetentionPolicy {
            keep,
            days,
            weeks,
            months,
            years,
        }
    }

    fn tags_of<'a>(selection: &'a Selection, name: &str) -> Vec<&'a Tag> {
        selection
            .files()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.tags.iter().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_keep_head_newest_files() {
        let files = daily_files("2025-08-10", 10);
        let selection = select(&files, &policy(2, 0, 0, 0, 0));

        assert_eq!(selection.len(), 2);
        assert!(selection.is_selected("db-2025-08-10T03-00-00.sql.gz"));
        assert!(selection.is_selected("db-2025-08-09T03-00-00.sql.gz"));
        assert_eq!(
            tags_of(&selection, "db-2025-08-10T03-00-00.sql.gz"),
            vec![&Tag::Keep]
        );
    }

    #[test]
    fn test_keep_clamps_to_available_files() {
        let files = daily_files("2025-08-10", 3);
        let selection = select(&files, &policy(10, 0, 0, 0, 0));

        assert_eq!(selection.len(), 3);
        for f in selection.files() {
            assert_eq!(f.tags.iter().collect::<Vec<_>>(), vec![&Tag::Keep]);
        }
    }

    #[test]
    fn test_ten_daily_files_keep_two_plus_three_daily() {
        let files = daily_files("2025-08-10", 10);
        let selection = select(&files, &policy(2, 3, 0, 0, 0));

        assert_eq!(selection.len(), 5);
        assert_eq!(
            tags_of(&selection, "db-2025-08-08T03-00-00.sql.gz"),
            vec![&Tag::Daily]
        );
        assert_eq!(
            tags_of(&selection, "db-2025-08-06T03-00-00.sql.gz"),
            vec![&Tag::Daily]
        );
        assert!(!selection.is_selected("db-2025-08-05T03-00-00.sql.gz"));
    }

    #[test]
    fn test_zero_quota_disables_tier() {
        let files = daily_files("2025-08-10", 10);
        let selection = select(&files, &policy(0, 0, 0, 0, 0));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_same_day_keeps_only_newer_file() {
        let files = vec![
            file("db-2025-08-10T23-00-00.sql.gz", "2025-08-10T23-00-00"),
            file("db-2025-08-10T01-00-00.sql.gz", "2025-08-10T01-00-00"),
        ];
        let selection = select(&files, &policy(0, 1, 0, 0, 0));

        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected("db-2025-08-10T23-00-00.sql.gz"));
    }

    #[test]
    fn test_tags_accumulate_across_tiers() {
        let files = vec![file("db-2025-08-10T03-00-00.sql.gz", "2025-08-10T03-00-00")];
        let selection = select(&files, &policy(0, 1, 1, 1, 1));

        assert_eq!(selection.len(), 1);
        assert_eq!(
            tags_of(&selection, "db-2025-08-10T03-00-00.sql.gz"),
            vec![&Tag::Daily, &Tag::Weekly, &Tag::Monthly, &Tag::Yearly]
        );
    }

    #[test]
    fn test_tier_quota_bounds_distinct_buckets() {
        // 30 daily files, quota of 2 weeks: only the newest file of each of
        // the two most recent ISO weeks gets the weekly tag.
        let files = daily_files("2025-08-10", 30);
        let selection = select(&files, &policy(0, 0, 2, 0, 0));

        let weekly: Vec<&str> = selection
            .files()
            .iter()
            .filter(|f| f.tags.contains(&Tag::Weekly))
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(
            weekly,
            vec![
                // 2025-08-10 is a Sunday, the last day of ISO week 32.
                "db-2025-08-10T03-00-00.sql.gz",
                "db-2025-08-03T03-00-00.sql.gz",
            ]
        );
    }

    #[test]
    fn test_week_key_uses_iso_week_year() {
        // 2025-12-29 (a Monday) and 2026-01-02 both fall in ISO week
        // 2026-W01. Keying by calendar year would split them into two
        // buckets; the ISO week-year key collapses them into one, so only
        // the newer file becomes the weekly representative.
        let files = vec![
            file("db-2026-01-02T03-00-00.sql.gz", "2026-01-02T03-00-00"),
            file("db-2025-12-29T03-00-00.sql.gz", "2025-12-29T03-00-00"),
        ];
        let selection = select(&files, &policy(0, 0, 2, 0, 0));

        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected("db-2026-01-02T03-00-00.sql.gz"));
    }

    #[test]
    fn test_head_files_do_not_consume_tier_quota() {
        // With keep=1 the newest file is out of the generational pass, so
        // the daily quota goes to the next file down.
        let files = daily_files("2025-08-10", 3);
        let selection = select(&files, &policy(1, 1, 0, 0, 0));

        assert_eq!(selection.len(), 2);
        assert_eq!(
            tags_of(&selection, "db-2025-08-10T03-00-00.sql.gz"),
            vec![&Tag::Keep]
        );
        assert_eq!(
            tags_of(&selection, "db-2025-08-09T03-00-00.sql.gz"),
            vec![&Tag::Daily]
        );
    }

    #[test]
    fn test_selection_deduplicates_by_filename() {
        let files = daily_files("2025-08-10", 40);
        let selection = select(&files, &policy(3, 7, 5, 6, 2));

        let mut names: Vec<&str> = selection.files().iter().map(|f| f.name.as_str()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_select_is_deterministic() {
        let files = daily_files("2025-08-10", 25);
        let policy = policy(2, 7, 5, 6, 2);

        let first: Vec<(String, Vec<Tag>)> = select(&files, &policy)
            .files()
            .iter()
            .map(|f| (f.name.clone(), f.tags.iter().copied().collect()))
            .collect();
        let second: Vec<(String, Vec<Tag>)> = select(&files, &policy)
            .files()
            .iter()
            .map(|f| (f.name.clone(), f.tags.iter().copied().collect()))
            .collect();
        assert_eq!(first, second);
    }
}
