//! Data structures representing messages from the CICS console.
//!
//! This module defines the core types used throughout the application
//! to represent status reports and GPS beacon reports emitted by the
//! transceiver on its serial console.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The classification of a raw console line, decided by its keyword prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Interactive `>` prompt, carries no data.
    Prompt,
    /// Current frequency report (`FREQ:`).
    Frequency,
    /// Current channel report (`CHAN:`).
    Channel,
    /// Scan state report (`SCAN:`).
    Scan,
    /// Sideband report (`SIDEBAND:`).
    Sideband,
    /// Call state info (any line starting with `CALL`).
    Call,
    /// Link state report (`LINK:`).
    Link,
    /// GPS beacon report from a remote station (`GPS-POSITION:`).
    GpsPosition,
    /// Anything else; ignored.
    Unrecognized,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Prompt => "prompt",
            MessageKind::Frequency => "frequency",
            MessageKind::Channel => "channel",
            MessageKind::Scan => "scan",
            MessageKind::Sideband => "sideband",
            MessageKind::Call => "call",
            MessageKind::Link => "link",
            MessageKind::GpsPosition => "gps-position",
            MessageKind::Unrecognized => "unrecognized",
        };
        write!(f, "{}", name)
    }
}

/// One field of the device status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusField {
    Channel,
    Frequency,
    Sideband,
    Scanning,
    ActiveCall,
    LinkState,
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusField::Channel => write!(f, "channel"),
            StatusField::Frequency => write!(f, "frequency"),
            StatusField::Sideband => write!(f, "sideband"),
            StatusField::Scanning => write!(f, "scanning"),
            StatusField::ActiveCall => write!(f, "active call"),
            StatusField::LinkState => write!(f, "link state"),
        }
    }
}

/// A decoded GPS beacon report.
///
/// # Example
///
/// A raw report like:
/// ```text
/// GPS-POSITION:   'Ham CODAN 005',   1542,   1882, 17/08 14:45, 2753.0015, S, 14023.6726, E, 051521
/// ```
///
/// decodes to a `GpsFix` with:
/// - `source_id`: 1542
/// - `dest_id`: 1882
/// - `local_time`: "17/08 14:45"
/// - `latitude`: -(27 + 53.0015/60) degrees
/// - `longitude`: 140 + 23.6726/60 degrees
/// - `utc_time`: "051521"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Numeric id of the station that sent the report.
    pub source_id: u32,

    /// Numeric id of the destination the report was addressed to.
    pub dest_id: u32,

    /// Device-local time text (`DD/MM HH:MM`), not parsed further.
    pub local_time: String,

    /// Latitude in signed decimal degrees (south negative).
    pub latitude: Decimal,

    /// Longitude in signed decimal degrees (west negative).
    pub longitude: Decimal,

    /// UTC time text as reported by the device (`HHMMSS`).
    pub utc_time: String,
}

impl fmt::Display for GpsFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id {} at {},{} ({} UTC)",
            self.source_id, self.latitude, self.longitude, self.utc_time
        )
    }
}

/// A parsed console message carrying data.
///
/// Prompt and unrecognized lines never produce a `CicsMessage`; they are
/// dropped during classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CicsMessage {
    /// Current dial frequency, kept as reported text (e.g. "7044.0").
    Frequency(String),
    /// Current channel name (e.g. "Ham CODAN 003").
    Channel(String),
    /// Scan state (e.g. "OFF").
    Scan(String),
    /// Sideband (e.g. "USB").
    Sideband(String),
    /// Active call state.
    Call(String),
    /// Link state.
    Link(String),
    /// GPS beacon report from a remote station.
    GpsPosition(GpsFix),
}

impl CicsMessage {
    /// The classification this message was produced from.
    pub fn kind(&self) -> MessageKind {
        match self {
            CicsMessage::Frequency(_) => MessageKind::Frequency,
            CicsMessage::Channel(_) => MessageKind::Channel,
            CicsMessage::Scan(_) => MessageKind::Scan,
            CicsMessage::Sideband(_) => MessageKind::Sideband,
            CicsMessage::Call(_) => MessageKind::Call,
            CicsMessage::Link(_) => MessageKind::Link,
            CicsMessage::GpsPosition(_) => MessageKind::GpsPosition,
        }
    }
}

impl fmt::Display for CicsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CicsMessage::Frequency(v) => write!(f, "frequency {}", v),
            CicsMessage::Channel(v) => write!(f, "channel '{}'", v),
            CicsMessage::Scan(v) => write!(f, "scan {}", v),
            CicsMessage::Sideband(v) => write!(f, "sideband {}", v),
            CicsMessage::Call(v) => write!(f, "call {}", v),
            CicsMessage::Link(v) => write!(f, "link {}", v),
            CicsMessage::GpsPosition(fix) => write!(f, "gps position {}", fix),
        }
    }
}
