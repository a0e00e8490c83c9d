//! Analysis passes for bigdirs scan results.
//!
//! - **Aggregation** - Roll own-level sizes up into subtree totals
//! - **Ranking** - Pick the largest directories with their content mix
//! - **Snapshots** - Persist totals and report growth since the last run
//!
//! # Aggregation and Ranking
//!
//! ```rust,ignore
//! use bigdirs_analyze::{aggregate, TopN};
//! use bigdirs_scan::{ScanConfig, Scanner};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut outcome = Scanner::new()
//!     .scan(&ScanConfig::new("/srv"), &CancellationToken::new())
//!     .unwrap();
//! aggregate(&mut outcome.records);
//!
//! let report = TopN::new().rank(&outcome.records, None);
//! for dir in &report.directories {
//!     println!("{:>3}. {} {}", dir.rank, dir.total_size, dir.path.display());
//! }
//! ```
//!
//! # Growth Since the Last Run
//!
//! ```rust,ignore
//! use bigdirs_analyze::{JsonSnapshotStore, SnapshotStore, TopN};
//!
//! let store = JsonSnapshotStore::new("/var/lib/bigdirs/srv.json");
//! let previous = store.load()?;
//! let report = TopN::new().rank(&outcome.records, previous.as_ref());
//! if outcome.completed {
//!     store.save_records(&outcome.root, &outcome.records, chrono::Utc::now())?;
//! }
//! ```

mod aggregate;
mod store;
mod top;

pub use aggregate::aggregate;
pub use store::{JsonSnapshotStore, SnapshotError, SnapshotStore, snapshot_file_name};
pub use top::{
    CategoryShare, Delta, RankedDirectory, TopConfig, TopConfigBuilder, TopN, TopReport,
    composition,
};
