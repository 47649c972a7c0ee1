//! Command issuer for the CICS console.
//!
//! Commands are fire-and-forget: the console answers asynchronously on
//! the receive loop and nothing here waits for or correlates replies.
//! Callers must not assume the next processed line answers the command
//! they just sent.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

use crate::state::CicsState;
use crate::transport::LineSink;

/// The fixed state-poll command sequence.
const STATE_POLL_COMMANDS: [&str; 4] = ["scan", "chan", "freq", "sb"];

/// Errors surfaced to command callers.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown callsign: {0}")]
    UnknownCallsign(String),

    #[error("Transport write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Issues poll commands over the transport's write half.
///
/// The sink is guarded by an async mutex so concurrent callers never
/// interleave the bytes of two commands.
pub struct Commander<S> {
    sink: Mutex<S>,
    state: Arc<CicsState>,
}

impl<S: LineSink> Commander<S> {
    pub fn new(sink: S, state: Arc<CicsState>) -> Self {
        Self {
            sink: Mutex::new(sink),
            state,
        }
    }

    /// Poll the current scan state, channel, frequency and sideband.
    ///
    /// Sends four fixed commands back to back; the replies arrive as
    /// independent lines and are applied independently.
    pub async fn poll_state(&self) -> Result<(), CommandError> {
        let mut sink = self.sink.lock().await;
        for command in STATE_POLL_COMMANDS {
            sink.send_line(command).await?;
        }
        Ok(())
    }

    /// Request a GPS beacon from the station with the given numeric id.
    pub async fn poll_gps_by_id(&self, id: u32) -> Result<(), CommandError> {
        let command = format!("gpsbeacon {:04} -lbt", id);
        self.sink.lock().await.send_line(&command).await?;
        Ok(())
    }

    /// Request a GPS beacon from a station by callsign.
    ///
    /// The callsign is resolved through the station directory; an
    /// unknown callsign sends nothing.
    pub async fn poll_gps_by_callsign(&self, callsign: &str) -> Result<(), CommandError> {
        match self.state.station_id(callsign) {
            Some(id) => self.poll_gps_by_id(id).await,
            None => {
                warn!("Unknown callsign: {}", callsign);
                Err(CommandError::UnknownCallsign(callsign.to_string()))
            }
        }
    }
}
