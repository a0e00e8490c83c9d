use bigdirs_core::{
    ContentCategory, DirStats, DirStatus, DirectoryRecord, IdentityKey, ScanConfig, ScanError,
    ScanOutcome, ScanWarning, SkipReason, Snapshot, TypeHistogram, WarningKind,
};
use chrono::{TimeZone, Utc};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

#[test]
fn test_identity_key() {
    let key1 = IdentityKey::new(64768, 131);
    let key2 = IdentityKey::new(64768, 131);
    assert_eq!(key1, key2);
    assert_eq!(key1.device, 64768);
    assert_eq!(key1.inode, 131);
    assert_ne!(key1, IdentityKey::new(64769, 131));
}

#[test]
fn test_scan_config_builder() {
    let config = ScanConfig::builder()
        .root("/srv")
        .exclude(vec!["/srv/cache".to_string(), "**/node_modules".to_string()])
        .slow_threshold(Duration::from_millis(500))
        .classify(false)
        .build()
        .unwrap();

    assert_eq!(config.root, PathBuf::from("/srv"));
    assert_eq!(config.exclude.len(), 2);
    assert_eq!(config.slow_threshold, Duration::from_millis(500));
    assert!(!config.classify);
    assert!(config.builtin_exclusions);
    assert!(config.extra_exclusions.is_empty());
}

#[test]
fn test_scan_config_rejects_zero_threshold() {
    let result = ScanConfig::builder()
        .root("/srv")
        .slow_threshold(Duration::ZERO)
        .build();
    assert!(result.is_err());
    assert!(ScanConfig::builder().build().is_err());
}

#[test]
fn test_scan_config_serde_defaults() {
    let config: ScanConfig = serde_json::from_str(r#"{"root":"/home"}"#).unwrap();
    assert_eq!(config.root, PathBuf::from("/home"));
    assert_eq!(config.slow_threshold, Duration::from_secs(2));
    assert!(config.classify);
    assert!(config.builtin_exclusions);
}

#[test]
fn test_scan_error_io_mapping() {
    let denied = ScanError::io("/root", io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(matches!(denied, ScanError::PermissionDenied { .. }));

    let missing = ScanError::io("/gone", io::Error::from(io::ErrorKind::NotFound));
    assert!(matches!(missing, ScanError::NotFound { .. }));
    assert_eq!(missing.to_string(), "Path not found: /gone");

    let other = ScanError::io("/disk", io::Error::other("bad sector"));
    assert!(matches!(other, ScanError::Io { .. }));
}

#[test]
fn test_warnings() {
    let warning = ScanWarning::read_error(
        "/var/lib/secret",
        &io::Error::from(io::ErrorKind::PermissionDenied),
    );
    assert_eq!(warning.kind, WarningKind::PermissionDenied);

    let slow = ScanWarning::slow_directory("/mnt/slow", Duration::from_millis(2500), 12);
    assert_eq!(slow.kind, WarningKind::SlowDirectory);
    assert_eq!(slow.message, "Gave up after 2.50s (12 entries read): /mnt/slow");
}

#[test]
fn test_dir_stats_times() {
    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let new = SystemTime::UNIX_EPOCH + Duration::from_secs(9_000);

    let mut a = DirStats::new();
    a.record_file(10, Some(new), Some(ContentCategory::Code));
    let mut b = DirStats::new();
    b.record_file(20, Some(old), None);
    b.record_file(5, None, Some(ContentCategory::Code));

    a.merge(&b);
    assert_eq!(a.size, 35);
    assert_eq!(a.file_count, 3);
    assert_eq!(a.oldest_modified, Some(old));
    assert_eq!(a.newest_modified, Some(new));
    assert_eq!(a.types.get(ContentCategory::Code), 15);
}

#[test]
fn test_record_statuses() {
    let mut own = DirStats::new();
    own.record_file(50, None, None);

    let scanned = DirectoryRecord::scanned("/a", own);
    assert!(scanned.status.is_scanned());
    assert_eq!(scanned.total_size(), 50);

    let slow = DirectoryRecord::skipped("/a/slow", SkipReason::Slow, own);
    assert_eq!(slow.status, DirStatus::Skipped(SkipReason::Slow));
    assert_eq!(slow.own_size(), 50);
    assert_eq!(slow.depth(), 3);

    let mut dup = DirectoryRecord::duplicate("/a/dup", IdentityKey::new(1, 2));
    dup.own = own;
    dup.reset_total();
    assert_eq!(dup.total_size(), 0);
    assert_eq!(dup.identity, Some(IdentityKey::new(1, 2)));
}

#[test]
fn test_histogram_serializes_sparse() {
    let mut histogram = TypeHistogram::new();
    histogram.add(ContentCategory::Video, 300);
    histogram.add(ContentCategory::DiskImage, 7);

    let json = serde_json::to_string(&histogram).unwrap();
    assert_eq!(json, r#"{"Video":300,"DiskImage":7}"#);

    let back: TypeHistogram = serde_json::from_str(&json).unwrap();
    assert_eq!(back, histogram);
    assert_eq!(ContentCategory::DiskImage.to_string(), "Disk Image");
}

#[test]
fn test_outcome_helpers() {
    let mut own = DirStats::new();
    own.record_file(5, None, None);
    let outcome = ScanOutcome::new(
        PathBuf::from("/a"),
        vec![
            DirectoryRecord::scanned("/a", own),
            DirectoryRecord::skipped("/a/b", SkipReason::Excluded, DirStats::new()),
        ],
        false,
        Duration::from_millis(12),
        vec![ScanWarning::new("/a/b", "excluded", WarningKind::ReadError)],
    );

    assert!(outcome.is_partial());
    assert!(outcome.has_warnings());
    assert_eq!(outcome.dir_count(), 2);
    assert_eq!(outcome.total_size(), 5);
    assert!(outcome.get("/a/b").is_some());
    assert!(outcome.get("/a/c").is_none());
}

#[test]
fn test_snapshot_json_shape() {
    let mut own = DirStats::new();
    own.record_file(42, None, None);
    let records = vec![
        DirectoryRecord::scanned("/data", own),
        DirectoryRecord::duplicate("/data/again", IdentityKey::new(3, 4)),
    ];
    let timestamp = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
    let snapshot = Snapshot::from_records("/data", &records, timestamp);

    assert_eq!(snapshot.len(), 1);
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["timestamp"], "2025-06-01T08:30:00Z");
    assert_eq!(value["entries"][0]["path"], "/data");
    assert_eq!(value["entries"][0]["size"], 42);
}
