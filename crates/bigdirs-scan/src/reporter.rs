//! Live, single-line progress display.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::progress::ScanProgress;

/// Default redraw cadence.
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(300);

/// Width reserved for the current path.
const PATH_WIDTH: usize = 40;

/// Renders the latest progress event at a fixed cadence.
///
/// Events arriving between ticks only replace the pending one, so drawing
/// cost does not grow with scan speed.
pub struct ProgressReporter {
    rx: broadcast::Receiver<ScanProgress>,
    cancel: CancellationToken,
    interval: Duration,
}

impl ProgressReporter {
    /// Create a reporter over a progress subscription.
    pub fn new(rx: broadcast::Receiver<ScanProgress>, cancel: CancellationToken) -> Self {
        Self {
            rx,
            cancel,
            interval: DEFAULT_RENDER_INTERVAL,
        }
    }

    /// Set the redraw cadence.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Draw until the event stream closes or `cancel` fires, then clear the
    /// line. Returns the sink once nothing more will be written to it.
    pub async fn run<W: Write>(mut self, mut out: W) -> io::Result<W> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut latest: Option<ScanProgress> = None;
        let mut dirty = false;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if dirty {
                        if let Some(progress) = &latest {
                            render(&mut out, progress)?;
                        }
                        dirty = false;
                    }
                }
                event = self.rx.recv() => match event {
                    Ok(progress) => {
                        latest = Some(progress);
                        dirty = true;
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
            }
        }

        queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        out.flush()?;
        Ok(out)
    }
}

fn render<W: Write>(out: &mut W, progress: &ScanProgress) -> io::Result<()> {
    let path = shorten_path(&progress.current_path.to_string_lossy(), PATH_WIDTH);
    queue!(
        out,
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        PrintStyledContent("Scanning:".cyan()),
        Print(" "),
        PrintStyledContent(format!("{path:<PATH_WIDTH$}").bold()),
        Print(" | "),
        PrintStyledContent("Dirs:".yellow()),
        Print(format!(" {} | ", progress.dirs_processed)),
        PrintStyledContent("Size:".green()),
        Print(format!(
            " {}",
            humansize::format_size(progress.bytes_scanned, humansize::BINARY)
        )),
    )?;
    out.flush()
}

/// Keep the tail of `path` so the deepest component stays visible.
fn shorten_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }
    let tail: String = path.chars().skip(len - (max_len - 1)).collect();
    format!("…{tail}")
}
