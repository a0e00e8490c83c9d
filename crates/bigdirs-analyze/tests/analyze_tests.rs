use bigdirs_analyze::{
    Delta, JsonSnapshotStore, SnapshotStore, TopConfig, TopN, aggregate, composition,
};
use bigdirs_core::{
    ContentCategory, DirStats, DirStatus, DirectoryRecord, IdentityKey, SkipReason, Snapshot,
    SnapshotEntry,
};
use bigdirs_scan::{ScanConfig, Scanner};
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn stats(size: u64, category: ContentCategory) -> DirStats {
    let mut stats = DirStats::new();
    stats.record_file(size, None, Some(category));
    stats
}

fn nested_records() -> Vec<DirectoryRecord> {
    vec![
        DirectoryRecord::scanned("/a", stats(100, ContentCategory::Document)),
        DirectoryRecord::scanned("/a/b", stats(200, ContentCategory::Image)),
        DirectoryRecord::scanned("/a/b/c", stats(300, ContentCategory::Video)),
    ]
}

fn total(records: &[DirectoryRecord], path: &str) -> u64 {
    records
        .iter()
        .find(|r| r.path == Path::new(path))
        .unwrap()
        .total_size()
}

#[test]
fn test_nested_totals() {
    let mut records = nested_records();
    aggregate(&mut records);

    assert_eq!(records[0].own_size(), 100);
    assert_eq!(records[1].own_size(), 200);
    assert_eq!(records[2].own_size(), 300);
    assert_eq!(total(&records, "/a/b/c"), 300);
    assert_eq!(total(&records, "/a/b"), 500);
    assert_eq!(total(&records, "/a"), 600);

    let root = &records[0].total;
    assert_eq!(root.file_count, 3);
    assert_eq!(root.types.get(ContentCategory::Video), 300);
    assert_eq!(root.types.total(), 600);
}

#[test]
fn test_aggregate_is_idempotent() {
    let mut once = nested_records();
    aggregate(&mut once);
    let mut twice = once.clone();
    aggregate(&mut twice);

    let sizes = |records: &[DirectoryRecord]| {
        records.iter().map(|r| r.total_size()).collect::<Vec<_>>()
    };
    assert_eq!(sizes(&once), sizes(&twice));
    assert_eq!(once[0].total, twice[0].total);
}

#[test]
fn test_total_equals_own_plus_counted_children() {
    let mut records = vec![
        DirectoryRecord::scanned("/r", stats(1, ContentCategory::Other)),
        DirectoryRecord::scanned("/r/a", stats(10, ContentCategory::Other)),
        DirectoryRecord::duplicate("/r/b", IdentityKey::new(1, 10)),
        DirectoryRecord::skipped("/r/c", SkipReason::Slow, stats(50, ContentCategory::Log)),
        DirectoryRecord::skipped("/r/d", SkipReason::ReadFailed, DirStats::new()),
        DirectoryRecord::scanned("/r/a/x", stats(100, ContentCategory::Other)),
        DirectoryRecord::scanned("/r/a/y", stats(1000, ContentCategory::Other)),
    ];
    aggregate(&mut records);

    for record in &records {
        assert!(record.total_size() >= record.own_size() || record.status.is_duplicate());
        let children: u64 = records
            .iter()
            .filter(|c| c.parent() == Some(record.path.as_path()))
            .filter(|c| !c.status.is_duplicate())
            .map(|c| c.total_size())
            .sum();
        if !record.status.is_duplicate() {
            assert_eq!(record.total_size(), record.own_size() + children);
        }
    }
    assert_eq!(total(&records, "/r"), 1 + 1110 + 50);
}

#[test]
fn test_rank_by_total_size() {
    let mut records = nested_records();
    records.push(DirectoryRecord::duplicate("/a/link", IdentityKey::new(1, 1)));
    aggregate(&mut records);

    let report = TopN::with_config(TopConfig::builder().limit(2usize).build().unwrap())
        .rank(&records, None);

    assert_eq!(report.considered, 3);
    assert_eq!(report.directories.len(), 2);
    assert_eq!(report.directories[0].path, PathBuf::from("/a"));
    assert_eq!(report.directories[0].rank, 1);
    assert_eq!(report.directories[1].path, PathBuf::from("/a/b"));
    assert!(report.directories.iter().all(|d| d.delta.is_none()));
    assert!(report.compared_to.is_none());

    let shares = &report.directories[0].composition;
    assert_eq!(shares[0].category, ContentCategory::Video);
    assert!((shares[0].percent - 50.0).abs() < 1e-9);
}

#[test]
fn test_rank_with_snapshot_delta() {
    let mut records = nested_records();
    aggregate(&mut records);

    let taken = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let previous = Snapshot {
        timestamp: taken,
        root: PathBuf::from("/a"),
        entries: vec![
            SnapshotEntry {
                path: PathBuf::from("/a"),
                size: 450,
            },
            SnapshotEntry {
                path: PathBuf::from("/a/b"),
                size: 700,
            },
        ],
    };

    let report = TopN::new().rank(&records, Some(&previous));
    let delta_of = |path: &str| {
        report
            .directories
            .iter()
            .find(|d| d.path == Path::new(path))
            .unwrap()
            .delta
    };

    assert_eq!(delta_of("/a"), Some(Delta::Changed(150)));
    assert_eq!(delta_of("/a/b"), Some(Delta::Changed(-200)));
    assert_eq!(delta_of("/a/b/c"), Some(Delta::New));
    assert_eq!(report.compared_to, Some(taken));
}

#[test]
fn test_min_size_filter() {
    let mut records = nested_records();
    aggregate(&mut records);

    let config = TopConfig::builder().min_size(400u64).build().unwrap();
    let report = TopN::with_config(config).rank(&records, None);
    assert_eq!(report.considered, 2);
    assert!(report.directories.iter().all(|d| d.total_size >= 400));
}

#[test]
fn test_scan_aggregate_snapshot_cycle() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    fs::create_dir_all(root.join("b/c")).unwrap();
    fs::write(root.join("f1.txt"), vec![0u8; 100]).unwrap();
    fs::write(root.join("b/f2.png"), vec![0u8; 200]).unwrap();
    fs::write(root.join("b/c/f3.mp4"), vec![0u8; 300]).unwrap();

    let mut outcome = Scanner::new()
        .scan(&ScanConfig::new(&root), &CancellationToken::new())
        .unwrap();
    assert!(outcome.completed);
    aggregate(&mut outcome.records);

    let canonical = outcome.root.clone();
    assert_eq!(outcome.root_record().unwrap().total_size(), 600);
    assert_eq!(outcome.get(canonical.join("b")).unwrap().total_size(), 500);
    assert!(
        outcome
            .records
            .iter()
            .all(|r| r.status == DirStatus::Scanned)
    );

    let store = JsonSnapshotStore::for_root(&temp.path().join("snapshots"), &canonical);
    assert!(store.load().unwrap().is_none());
    store
        .save_records(&canonical, &outcome.records, Utc::now())
        .unwrap();

    fs::write(root.join("b/c/f4.mp4"), vec![0u8; 50]).unwrap();
    let mut second = Scanner::new()
        .scan(&ScanConfig::new(&root), &CancellationToken::new())
        .unwrap();
    aggregate(&mut second.records);

    let previous = store.load().unwrap();
    let report = TopN::new().rank(&second.records, previous.as_ref());
    for dir in &report.directories {
        assert_eq!(dir.delta, Some(Delta::Changed(50)));
    }
    assert_eq!(
        report.directories[0].composition[0].category,
        ContentCategory::Video
    );
    assert_eq!(composition(&second.root_record().unwrap().own).len(), 1);
}
