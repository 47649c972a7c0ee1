//! CICS Listener - A Rust library and daemon for monitoring a Codan NGT
//! transceiver over its CICS serial console.
//!
//! This crate provides:
//! - A parser for the console's asynchronous status and GPS beacon lines
//! - A lock-guarded store of device status and known remote stations
//! - An async receive loop with an explicit start/stop lifecycle
//! - A fire-and-forget command issuer for polling the device
//!
//! # Example
//!
//! ```rust
//! use cics_listener::{parser::parse_line, state::CicsState};
//!
//! let state = CicsState::with_stations([("VK5QI", 1337)]);
//!
//! if let Some(message) = parse_line("FREQ: 7044.0 RX/TX\r\n").expect("Failed to parse line") {
//!     state.apply(&message);
//! }
//!
//! assert_eq!(state.snapshot().frequency.as_deref(), Some("7044.0"));
//! ```

pub mod command;
pub mod config;
pub mod listener;
pub mod message;
pub mod parser;
pub mod state;
pub mod stats;
pub mod transport;

pub use command::{CommandError, Commander};
pub use config::{Config, StationEntry};
pub use listener::{ListenerHandle, StopReason};
pub use message::{CicsMessage, GpsFix, MessageKind, StatusField};
pub use parser::{ParseError, classify, parse_gps_position, parse_line};
pub use state::{Applied, CicsState, DeviceStatus, StationRecord, StationUpdate};
pub use stats::{ListenerStats, StatsSummary};
pub use transport::{LineSink, LineSource, ReadOutcome, open_serial};
