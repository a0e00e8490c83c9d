//! bigdirs - find the largest directories under a path.
//!
//! Usage:
//!   bigdirs [PATH]                 Rank directories under PATH (default: /)
//!   bigdirs /home -n 30            Show the 30 largest
//!   bigdirs /srv -e /srv/cache     Skip a subtree
//!   bigdirs --format json          Machine-readable output
//!   bigdirs --help                 Show help

mod render;
mod settings;

use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use bigdirs_analyze::{JsonSnapshotStore, SnapshotStore, TopConfig, TopN, aggregate};
use bigdirs_core::Snapshot;
use bigdirs_scan::{ProcMounts, ProgressReporter, ScanConfig, Scanner};

use crate::render::{TextRenderer, render_json};
use crate::settings::UserSettings;

#[derive(Parser)]
#[command(
    name = "bigdirs",
    version,
    about = "Find the largest directories under a path",
    long_about = "bigdirs walks a directory tree breadth-first and lists the directories \
                  with the largest total size, their content mix, and how much they grew \
                  since the previous run.\n\n\
                  Press Ctrl-C to stop early and get partial results."
)]
struct Cli {
    /// Directory to scan (defaults to / when it exists, else the current directory)
    path: Option<PathBuf>,

    /// Number of directories to show
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Give up on a single directory after this long (e.g. "500ms", "2s", "1m")
    #[arg(long)]
    slow_threshold: Option<String>,

    /// Path prefix or glob pattern to skip (repeatable)
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Do not break sizes down by file type
    #[arg(long)]
    no_classify: bool,

    /// Neither read nor write a snapshot
    #[arg(long)]
    no_snapshot: bool,

    /// Snapshot file to compare with and update
    #[arg(long, value_name = "FILE", conflicts_with = "no_snapshot")]
    snapshot: Option<PathBuf>,

    /// Also enter proc, sys, dev, run, tmp and var
    #[arg(long)]
    include_system: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command line merged with user settings.
#[derive(Debug)]
struct RunOptions {
    root: PathBuf,
    top: usize,
    slow_threshold: Duration,
    exclude: Vec<String>,
    classify: bool,
    builtin_exclusions: bool,
    snapshot: SnapshotChoice,
    format: OutputFormat,
}

#[derive(Debug, PartialEq)]
enum SnapshotChoice {
    Disabled,
    File(PathBuf),
    Dir(Option<PathBuf>),
}

impl RunOptions {
    fn resolve(cli: Cli, settings: UserSettings) -> Result<Self> {
        let slow_threshold = cli
            .slow_threshold
            .as_deref()
            .unwrap_or(&settings.slow_threshold);
        let slow_threshold = parse_duration(slow_threshold)?;

        let mut exclude = settings.exclude;
        exclude.extend(cli.exclude);

        let snapshot = if cli.no_snapshot {
            SnapshotChoice::Disabled
        } else if let Some(file) = cli.snapshot {
            SnapshotChoice::File(file)
        } else {
            SnapshotChoice::Dir(settings.snapshot_dir)
        };

        Ok(Self {
            root: cli.path.unwrap_or_else(default_root),
            top: cli.top.unwrap_or(settings.top),
            slow_threshold,
            exclude,
            classify: !cli.no_classify,
            builtin_exclusions: !cli.include_system,
            snapshot,
            format: cli.format,
        })
    }

    /// Snapshot store for the canonical `root`, if snapshots are wanted.
    fn snapshot_store(&self, root: &Path) -> Option<JsonSnapshotStore> {
        match &self.snapshot {
            SnapshotChoice::Disabled => None,
            SnapshotChoice::File(file) => Some(JsonSnapshotStore::new(file)),
            SnapshotChoice::Dir(dir) => dir
                .clone()
                .or_else(JsonSnapshotStore::default_dir)
                .map(|dir| JsonSnapshotStore::for_root(&dir, root)),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = RunOptions::resolve(cli, UserSettings::load())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(run(options))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("BIGDIRS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(options: RunOptions) -> Result<()> {
    let root = options
        .root
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", options.root.display()))?;

    let config = ScanConfig::builder()
        .root(&options.root)
        .exclude(options.exclude.clone())
        .slow_threshold(options.slow_threshold)
        .classify(options.classify)
        .builtin_exclusions(options.builtin_exclusions)
        .build()
        .context("Invalid scan configuration")?;

    let store = options.snapshot_store(&root);
    let previous = store
        .as_ref()
        .and_then(|store| load_previous(store, &root));

    announce_scan(io::stderr(), &root)?;

    let cancel = CancellationToken::new();
    let scanner = Scanner::new().with_mount_classifier(ProcMounts::new());

    let progress_line = io::stderr().is_terminal();
    let reporter = progress_line.then(|| {
        let reporter = ProgressReporter::new(scanner.subscribe(), cancel.clone());
        tokio::spawn(reporter.run(io::stderr()))
    });

    let interrupt = tokio::spawn(cancel_on_interrupt(
        tokio::signal::ctrl_c(),
        cancel.clone(),
        io::stderr(),
        progress_line,
    ));

    // The scanner moves onto the blocking thread and is dropped there, which
    // closes the progress stream.
    let scan = {
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || scanner.scan(&config, &cancel))
    };
    let result = scan.await.context("Scan task panicked")?;
    interrupt.abort();

    if let Some(reporter) = reporter {
        reporter
            .await
            .context("Progress task panicked")?
            .context("Failed to draw progress")?;
    }

    let mut outcome = result.context("Scan failed")?;

    aggregate(&mut outcome.records);

    let top = TopN::with_config(TopConfig {
        limit: options.top,
        ..TopConfig::default()
    });
    let report = top.rank(&outcome.records, previous.as_ref());

    match options.format {
        OutputFormat::Text => {
            let renderer = TextRenderer::new(io::stdout().is_terminal());
            renderer.render(&mut io::stdout().lock(), &outcome, &report)?;
        }
        OutputFormat::Json => {
            render_json(io::stdout().lock(), &outcome, &report)?;
        }
    }

    // Partial totals are lower bounds; keep the last complete snapshot.
    if outcome.completed {
        if let Some(store) = &store {
            if let Err(err) = store.save_records(&outcome.root, &outcome.records, Utc::now()) {
                warn!(%err, "failed to save snapshot");
            }
        }
    }

    Ok(())
}

fn announce_scan<W: Write>(mut out: W, root: &Path) -> io::Result<()> {
    writeln!(out, "Scanning '{}'...", root.display())?;
    out.flush()
}

/// Previous snapshot of `root`, if one exists and was taken for that root.
fn load_previous(store: &impl SnapshotStore, root: &Path) -> Option<Snapshot> {
    let snapshot = match store.load() {
        Ok(snapshot) => snapshot?,
        Err(err) => {
            warn!(%err, "ignoring previous snapshot");
            return None;
        }
    };
    if !snapshot.is_for(root) {
        warn!(
            stored = %snapshot.root.display(),
            root = %root.display(),
            "ignoring snapshot of another root"
        );
        return None;
    }
    Some(snapshot)
}

/// Wait for `signal`, then cancel the scan and tell the user. A failed signal
/// listener leaves the scan running.
async fn cancel_on_interrupt<W: Write>(
    signal: impl Future<Output = io::Result<()>>,
    cancel: CancellationToken,
    mut out: W,
    progress_line: bool,
) {
    if let Err(err) = signal.await {
        warn!(%err, "cannot listen for Ctrl-C");
        return;
    }
    cancel.cancel();
    let lead = if progress_line { "\n" } else { "" };
    let _ = writeln!(out, "{lead}Interrupted. Finalizing...");
}

/// `/` when it exists, else the current directory.
fn default_root() -> PathBuf {
    let root = Path::new("/");
    if root.is_dir() {
        root.to_path_buf()
    } else {
        PathBuf::from(".")
    }
}

/// Parse a duration string (e.g., "500ms", "2s", "1m", "1h"). A bare number
/// is seconds.
fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num, multiplier) = if let Some(num) = s.strip_suffix("ms") {
        (num, 0.001)
    } else if let Some(num) = s.strip_suffix('s') {
        (num, 1.0)
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 60.0)
    } else if let Some(num) = s.strip_suffix('h') {
        (num, 60.0 * 60.0)
    } else {
        (s.as_str(), 1.0)
    };

    let num: f64 = num
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration: {s}"))?;
    if !num.is_finite() || num <= 0.0 {
        bail!("Duration must be positive: {s}");
    }

    Duration::try_from_secs_f64(num * multiplier)
        .with_context(|| format!("Duration out of range: {s}"))
}
