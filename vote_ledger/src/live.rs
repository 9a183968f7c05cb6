//! Background refresh of the results.

use log::{debug, info, warn};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::VotingErrors;
use crate::report::ReportStyle;
use crate::VoteLedger;

/// How often the live results are refreshed by default.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Receives the rendered reports.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, report: String);
}

/// A display with a single slot: only the most recent report is kept.
#[derive(Debug, Default)]
pub struct LatestReport {
    slot: Mutex<(u64, Option<String>)>,
}

impl LatestReport {
    pub fn new() -> LatestReport {
        LatestReport::default()
    }

    /// The last report published, if any.
    pub fn latest(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.1.clone())
    }

    /// How many reports were published so far.
    pub fn publications(&self) -> u64 {
        self.slot.lock().map(|s| s.0).unwrap_or(0)
    }
}

impl DisplaySink for LatestReport {
    fn publish(&self, report: String) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.0 += 1;
            slot.1 = Some(report);
        }
    }
}

/// Handle to a running refresh loop.
///
/// Dropping the handle disconnects the channel, which cancels the loop
/// without waiting for it.
#[derive(Debug)]
pub struct LiveRefreshHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl LiveRefreshHandle {
    /// Cancels the loop and waits for it to finish.
    ///
    /// The loop wakes up immediately, even in the middle of an interval.
    pub fn stop(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            if j.join().is_err() {
                warn!("live refresh thread panicked");
            }
        }
    }

    /// True once the loop has exited, either cancelled or after a render failure.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map(|j| j.is_finished()).unwrap_or(true)
    }
}

pub struct LiveRefresh;

impl LiveRefresh {
    /// Starts publishing the results of the ledger to the sink.
    ///
    /// A first report is published right away, then one every `interval`.
    pub fn spawn(
        ledger: Arc<VoteLedger>,
        sink: Arc<dyn DisplaySink>,
        interval: Duration,
        style: ReportStyle,
    ) -> Result<LiveRefreshHandle, VotingErrors> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name("live-results".to_string())
            .spawn(move || refresh_loop(&ledger, sink.as_ref(), &shutdown_rx, interval, style))
            .map_err(|e| VotingErrors::RefreshSpawn(e.to_string()))?;
        info!("Live results started, refreshing every {:?}", interval);
        Ok(LiveRefreshHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn refresh_loop(
    ledger: &VoteLedger,
    sink: &dyn DisplaySink,
    shutdown_rx: &mpsc::Receiver<()>,
    interval: Duration,
    style: ReportStyle,
) {
    loop {
        match shutdown_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match ledger.render_with(style) {
            Ok(report) => sink.publish(report),
            Err(e) => {
                warn!("live refresh stopped: {}", e);
                return;
            }
        }

        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("live refresh cancelled");
}
