//! The receive loop: pulls lines from the transport and folds them into
//! the shared state.
//!
//! The loop runs as a spawned task for the lifetime of the connection.
//! It has an explicit lifecycle: [`start`] returns a [`ListenerHandle`]
//! the owner must use to stop or join the loop. A malformed line never
//! terminates the loop; only an explicit stop or transport closure does.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::message::MessageKind;
use crate::parser::{classify, parse_line};
use crate::state::{Applied, CicsState};
use crate::stats::ListenerStats;
use crate::transport::{LineSource, ReadOutcome};

/// Why the receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An explicit stop was requested through the handle.
    Requested,
    /// The transport closed or reported an unrecoverable read fault.
    TransportClosed,
}

/// Handle to a running receive loop.
///
/// Dropping the handle without calling [`stop`](Self::stop) also stops
/// the loop; the owner always controls its lifetime.
pub struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<StopReason>,
}

impl ListenerHandle {
    /// Request a stop and wait for the loop to exit.
    ///
    /// The loop observes the request within one read-timeout interval
    /// even while blocked waiting for a line.
    pub async fn stop(self) -> StopReason {
        let _ = self.shutdown.send(true);
        self.task.await.unwrap_or(StopReason::TransportClosed)
    }

    /// Wait for the loop to exit on its own (transport closure).
    pub async fn join(self) -> StopReason {
        self.task.await.unwrap_or(StopReason::TransportClosed)
    }

    /// Whether the loop has already exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the receive loop over the given line source.
///
/// The loop classifies and extracts each incoming line and applies the
/// result to `state`, recording what happened in `stats`.
pub fn start(
    source: impl LineSource + 'static,
    state: Arc<CicsState>,
    stats: Arc<ListenerStats>,
) -> ListenerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_loop(source, state, stats, shutdown_rx));
    ListenerHandle {
        shutdown: shutdown_tx,
        task,
    }
}

async fn run_loop(
    mut source: impl LineSource,
    state: Arc<CicsState>,
    stats: Arc<ListenerStats>,
    mut shutdown: watch::Receiver<bool>,
) -> StopReason {
    info!("Receive loop running");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // A closed channel means the handle is gone; stop too.
                if changed.is_err() || *shutdown.borrow() {
                    info!("Receive loop stopping on request");
                    return StopReason::Requested;
                }
            }

            outcome = source.next_line() => match outcome {
                Ok(ReadOutcome::Line(line)) => {
                    if !line.is_empty() {
                        process_line(&line, &state, &stats);
                    }
                }
                Ok(ReadOutcome::TimedOut) => {
                    // Quiet interval; keep listening.
                }
                Ok(ReadOutcome::Closed) => {
                    info!("Transport closed, receive loop exiting");
                    return StopReason::TransportClosed;
                }
                Err(e) => {
                    warn!("Transport read error: {}", e);
                    return StopReason::TransportClosed;
                }
            }
        }
    }
}

/// Process a single console line.
///
/// Parse failures are recorded and logged but otherwise swallowed here:
/// a bad line must never take the listener down.
fn process_line(line: &str, state: &CicsState, stats: &ListenerStats) {
    stats.record_line(line.len() as u64);

    match classify(line) {
        MessageKind::Prompt => {
            stats.record_prompt();
        }
        MessageKind::Unrecognized => {
            stats.record_unrecognized();
            debug!("Ignoring line: {:?}", line.trim_end());
        }
        _ => match parse_line(line) {
            Ok(Some(message)) => match state.apply(&message) {
                Applied::Status(_) => stats.record_status_update(),
                Applied::Stations(_) => stats.record_gps_matched(),
                Applied::UnknownStation(_) => stats.record_gps_unmatched(),
            },
            Ok(None) => {}
            Err(e) => {
                stats.record_parse_failure();
                debug!("Parse error for {:?}: {}", line.trim_end(), e);
            }
        },
    }
}
