//! Telemetry channels and the observed/reported ledger.
//!
//! Every publishable metric is a [`Channel`].  The engine writes the latest
//! observation per channel into the [`TelemetryLedger`]; the
//! [`DeltaFilter`](filter::DeltaFilter) later decides which observations are
//! worth publishing and moves them into the reported column.

pub mod filter;

use core::fmt;


use crate::fsm::RunMode;
use crate::protocol::ChargingState;

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    BatteryVoltage = 0,
    BatteryCurrent = 1,
    BatteryTemperature = 2,
    BatteryCharge = 3,
    BatteryCapacity = 4,
    BatteryPercent = 5,
    ChargingState = 6,
    Status = 7,
    CleaningDuration = 8,
    CleaningDistance = 9,
}

impl Channel {
    pub const COUNT: usize = 10;

    /// Channels backed by the ledger, in publish order.
    pub const TRACKED: [Channel; 8] = [
        Self::BatteryVoltage,
        Self::BatteryCurrent,
        Self::BatteryTemperature,
        Self::BatteryCharge,
        Self::BatteryCapacity,
        Self::BatteryPercent,
        Self::ChargingState,
        Self::Status,
    ];

    /// Topic-style name, `<category>/<metric>`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BatteryVoltage => "sensor/batteryVoltage",
            Self::BatteryCurrent => "sensor/batteryCurrent",
            Self::BatteryTemperature => "sensor/batteryTemperature",
            Self::BatteryCharge => "sensor/batteryCharge",
            Self::BatteryCapacity => "sensor/batteryCapacity",
            Self::BatteryPercent => "sensor/batteryPercent",
            Self::ChargingState => "sensor/chargingState",
            Self::Status => "client/status",
            Self::CleaningDuration => "sensor/cleaningDuration",
            Self::CleaningDistance => "sensor/cleaningDistance",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Number(i32),
    Charging(ChargingState),
    Status(RunMode),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Charging(cs) => f.write_str(cs.name()),
            Self::Status(mode) => f.write_str(mode.name()),
        }
    }
}

/// One `(channel, value)` pair ready for a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub channel: Channel,
    pub value: Value,
}

impl Reading {
    pub const fn new(channel: Channel, value: Value) -> Self {
        Self { channel, value }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Last observed and last reported value per channel.
#[derive(Debug, Clone, Default)]
pub struct TelemetryLedger {
    observed: [Option<Value>; Channel::COUNT],
    reported: [Option<Value>; Channel::COUNT],
}

impl TelemetryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, channel: Channel, value: Value) {
        self.observed[channel as usize] = Some(value);
    }

    pub fn observed(&self, channel: Channel) -> Option<Value> {
        self.observed[channel as usize]
    }

    pub fn reported(&self, channel: Channel) -> Option<Value> {
        self.reported[channel as usize]
    }

    pub fn mark_reported(&mut self, channel: Channel, value: Value) {
        self.reported[channel as usize] = Some(value);
    }

    /// Forget everything published so far; the next evaluation reports every
    /// observed channel again.
    pub fn clear_reported(&mut self) {
        self.reported = [None; Channel::COUNT];
    }
}

/// Battery percentage, `charge × 100 / capacity` clamped to 100.
///
/// A zero capacity yields 0.
pub fn percent_remaining(charge_mah: u16, capacity_mah: u16) -> u8 {
    if capacity_mah == 0 {
        return 0;
    }
    let pct = u32::from(charge_mah) * 100 / u32::from(capacity_mah);
    pct.min(100) as u8
}
