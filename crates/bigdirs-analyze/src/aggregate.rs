//! Bottom-up rollup of own-level stats into subtree totals.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use bigdirs_core::DirectoryRecord;

/// Roll every record's own stats up into its ancestors' `total`.
///
/// Totals are rebuilt from `own` on every call, so aggregating an already
/// aggregated set changes nothing. Duplicates contribute nothing. A record
/// whose parent is not in the set stops there.
pub fn aggregate(records: &mut [DirectoryRecord]) {
    for record in records.iter_mut() {
        record.reset_total();
    }

    let parents: Vec<Option<usize>> = {
        let index: HashMap<&Path, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.path.as_path(), i))
            .collect();
        records
            .iter()
            .map(|r| r.parent().and_then(|p| index.get(p).copied()))
            .collect()
    };

    // Deepest first, so a child's total is final before it reaches its parent.
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| Reverse(records[i].depth()));

    let mut merged = 0usize;
    for i in order {
        if records[i].status.is_duplicate() {
            continue;
        }
        let Some(parent) = parents[i] else {
            continue;
        };
        let total = records[i].total;
        records[parent].total.merge(&total);
        merged += 1;
    }

    debug!(records = records.len(), merged, "aggregated directory totals");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdirs_core::{DirStats, IdentityKey, SkipReason};

    fn stats(size: u64) -> DirStats {
        let mut stats = DirStats::new();
        if size > 0 {
            stats.record_file(size, None, None);
        }
        stats
    }

    #[test]
    fn test_orphan_is_its_own_total() {
        let mut records = vec![
            DirectoryRecord::scanned("/a", stats(10)),
            DirectoryRecord::scanned("/x/y", stats(5)),
        ];
        aggregate(&mut records);
        assert_eq!(records[0].total_size(), 10);
        assert_eq!(records[1].total_size(), 5);
    }

    #[test]
    fn test_duplicate_adds_nothing() {
        let mut records = vec![
            DirectoryRecord::scanned("/a", stats(1)),
            DirectoryRecord::duplicate("/a/b", IdentityKey::new(1, 1)),
        ];
        aggregate(&mut records);
        assert_eq!(records[0].total_size(), 1);
        assert_eq!(records[1].total_size(), 0);
    }

    #[test]
    fn test_skipped_contributes_partial_size() {
        let mut records = vec![
            DirectoryRecord::scanned("/a", stats(1)),
            DirectoryRecord::skipped("/a/slow", SkipReason::Slow, stats(50)),
        ];
        aggregate(&mut records);
        assert_eq!(records[0].total_size(), 51);
        assert_eq!(records[0].total.file_count, 2);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut records = vec![
            DirectoryRecord::scanned("/a/b/c", stats(300)),
            DirectoryRecord::scanned("/a", stats(100)),
            DirectoryRecord::scanned("/a/b", stats(200)),
        ];
        aggregate(&mut records);
        assert_eq!(records[0].total_size(), 300);
        assert_eq!(records[1].total_size(), 600);
        assert_eq!(records[2].total_size(), 500);
    }
}
