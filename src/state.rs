//! In-memory store for device status and the known-station directory.
//!
//! The store is the only shared mutable state in the system: the receive
//! loop writes parsed updates into it while any number of callers read
//! snapshots or look up stations. All access goes through lock-guarded
//! methods; the raw containers are never exposed.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::message::{CicsMessage, StatusField};

/// Last-known device status, one field per console report kind.
///
/// Every field starts unknown (`None`) and is overwritten whenever a
/// matching line is parsed. Fields are independent: the device reports
/// them at different times and nothing couples them, so a snapshot may
/// mix values reported minutes apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub channel: Option<String>,
    pub frequency: Option<String>,
    pub sideband: Option<String>,
    pub scanning: Option<String>,
    pub active_call: Option<String>,
    pub link_state: Option<String>,
}

impl DeviceStatus {
    fn set(&mut self, field: StatusField, value: String) {
        match field {
            StatusField::Channel => self.channel = Some(value),
            StatusField::Frequency => self.frequency = Some(value),
            StatusField::Sideband => self.sideband = Some(value),
            StatusField::Scanning => self.scanning = Some(value),
            StatusField::ActiveCall => self.active_call = Some(value),
            StatusField::LinkState => self.link_state = Some(value),
        }
    }

    /// Get one field's value, if it has been reported yet.
    pub fn get(&self, field: StatusField) -> Option<&str> {
        match field {
            StatusField::Channel => self.channel.as_deref(),
            StatusField::Frequency => self.frequency.as_deref(),
            StatusField::Sideband => self.sideband.as_deref(),
            StatusField::Scanning => self.scanning.as_deref(),
            StatusField::ActiveCall => self.active_call.as_deref(),
            StatusField::LinkState => self.link_state.as_deref(),
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unknown = "Unknown";
        writeln!(f, "Channel:     {}", self.channel.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Frequency:   {}", self.frequency.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Sideband:    {}", self.sideband.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Scanning:    {}", self.scanning.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Active call: {}", self.active_call.as_deref().unwrap_or(unknown))?;
        write!(f, "Link state:  {}", self.link_state.as_deref().unwrap_or(unknown))
    }
}

/// A remote station known to the directory.
///
/// Stations are keyed by callsign elsewhere; the record carries the
/// device's numeric id used to correlate incoming GPS reports, plus the
/// last position heard. The id never changes once the record is seeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    /// Device-assigned numeric station id.
    pub id: u32,

    /// Last reported latitude in signed decimal degrees.
    pub latitude: Option<Decimal>,

    /// Last reported longitude in signed decimal degrees.
    pub longitude: Option<Decimal>,

    /// Wall-clock time the last GPS report was received (not the
    /// device-reported time).
    pub last_heard: Option<DateTime<Utc>>,
}

impl StationRecord {
    /// Create a record with no position heard yet.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            latitude: None,
            longitude: None,
            last_heard: None,
        }
    }
}

/// Outcome of a position update keyed by numeric id.
#[derive(Debug, Clone, PartialEq)]
pub enum StationUpdate {
    /// One or more directory records carried the id and were updated.
    Matched { callsigns: Vec<String> },
    /// No record carries the id; nothing was changed.
    NoMatch,
}

/// Outcome of folding one parsed message into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A device status field was overwritten.
    Status(StatusField),
    /// A GPS report updated these stations.
    Stations(Vec<String>),
    /// A GPS report arrived from an id with no directory record.
    UnknownStation(u32),
}

/// Shared device state: status snapshot plus the station directory.
///
/// Clone-out reads and per-update writes are each guarded by their own
/// lock; critical sections are a single field or record update, never
/// I/O.
#[derive(Debug, Default)]
pub struct CicsState {
    status: RwLock<DeviceStatus>,
    stations: RwLock<HashMap<String, StationRecord>>,
}

impl CicsState {
    /// Create an empty store: all status fields unknown, no stations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with callsign/id pairs.
    pub fn with_stations<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let state = Self::new();
        for (callsign, id) in seed {
            state.insert_station(callsign, id);
        }
        state
    }

    /// Seed a directory entry. An existing record for the callsign is
    /// replaced wholesale.
    pub fn insert_station(&self, callsign: impl Into<String>, id: u32) {
        let mut stations = self.stations.write().unwrap();
        stations.insert(callsign.into(), StationRecord::new(id));
    }

    /// Overwrite one device status field.
    pub fn apply_status(&self, field: StatusField, value: String) {
        let mut status = self.status.write().unwrap();
        status.set(field, value);
    }

    /// A consistent copy of all status fields.
    pub fn snapshot(&self) -> DeviceStatus {
        self.status.read().unwrap().clone()
    }

    /// Look up a station by callsign (case-sensitive).
    pub fn station(&self, callsign: &str) -> Option<StationRecord> {
        self.stations.read().unwrap().get(callsign).cloned()
    }

    /// The numeric id for a callsign, if known.
    pub fn station_id(&self, callsign: &str) -> Option<u32> {
        self.stations.read().unwrap().get(callsign).map(|r| r.id)
    }

    /// A copy of the whole directory, sorted by callsign.
    pub fn stations(&self) -> Vec<(String, StationRecord)> {
        let mut entries: Vec<_> = self
            .stations
            .read()
            .unwrap()
            .iter()
            .map(|(callsign, record)| (callsign.clone(), record.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Record a position for every station whose id matches.
    ///
    /// The directory is small; a linear scan is fine. Callsigns are
    /// unique but ids are not required to be, so all matching records
    /// are updated.
    pub fn update_station_position(
        &self,
        id: u32,
        latitude: Decimal,
        longitude: Decimal,
        seen_at: DateTime<Utc>,
    ) -> StationUpdate {
        let mut stations = self.stations.write().unwrap();
        let mut callsigns = Vec::new();

        for (callsign, record) in stations.iter_mut() {
            if record.id == id {
                record.latitude = Some(latitude);
                record.longitude = Some(longitude);
                record.last_heard = Some(seen_at);
                callsigns.push(callsign.clone());
            }
        }

        if callsigns.is_empty() {
            StationUpdate::NoMatch
        } else {
            callsigns.sort();
            StationUpdate::Matched { callsigns }
        }
    }

    /// Fold one parsed console message into the store.
    ///
    /// Status reports overwrite their field. GPS reports update every
    /// station whose id matches the report's source; a report from an
    /// unmapped id is dropped without touching the directory. The
    /// wall-clock receive time is recorded as last-heard.
    pub fn apply(&self, message: &CicsMessage) -> Applied {
        let (field, value) = match message {
            CicsMessage::Frequency(v) => (StatusField::Frequency, v),
            CicsMessage::Channel(v) => (StatusField::Channel, v),
            CicsMessage::Scan(v) => (StatusField::Scanning, v),
            CicsMessage::Sideband(v) => (StatusField::Sideband, v),
            CicsMessage::Call(v) => (StatusField::ActiveCall, v),
            CicsMessage::Link(v) => (StatusField::LinkState, v),
            CicsMessage::GpsPosition(fix) => {
                info!(
                    "RX GPS position: {},{},{},{}",
                    fix.source_id, fix.local_time, fix.latitude, fix.longitude
                );
                return match self.update_station_position(
                    fix.source_id,
                    fix.latitude,
                    fix.longitude,
                    Utc::now(),
                ) {
                    StationUpdate::Matched { callsigns } => {
                        for callsign in &callsigns {
                            info!("Id {} matched callsign {}", fix.source_id, callsign);
                        }
                        Applied::Stations(callsigns)
                    }
                    StationUpdate::NoMatch => {
                        debug!("GPS report from unknown station id {}", fix.source_id);
                        Applied::UnknownStation(fix.source_id)
                    }
                };
            }
        };

        self.apply_status(field, value.clone());
        info!("Status update: {} = {}", field, value);
        Applied::Status(field)
    }
}
