//! Shared mutable state threaded through every FSM handler.
//!
//! `DeviceState` is the blackboard the handlers read from and write to:
//! the latest decoded frame, the vote it produced, the cleaning-cycle
//! timestamps, the odometer, and the telemetry ledger.

use log::warn;
use serde::Serialize;

use crate::config::SystemConfig;
use crate::odometry::OdometryAccumulator;
use crate::protocol::SensorFrame;
use crate::telemetry::{Channel, TelemetryLedger, Value, percent_remaining};

use super::RunMode;
use super::vote::CleaningEvidence;

// ---------------------------------------------------------------------------
// Cleaning cycle
// ---------------------------------------------------------------------------

/// Timestamps of the current (or most recent) cleaning cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningCycle {
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_ms: u64,
}

/// Summary published once when a cycle ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub duration_secs: u64,
    pub distance_mm: u32,
}

// ---------------------------------------------------------------------------
// DeviceState
// ---------------------------------------------------------------------------

pub struct DeviceState {
    /// Current inferred mode.  Written only by the FSM engine.
    pub run_mode: RunMode,
    /// Timestamp of the poll being evaluated (ms since boot).
    pub now_ms: u64,

    /// Latest decoded frame; `None` when the last poll failed.
    pub frame: Option<SensorFrame>,
    /// Cleaning votes for `frame` (0 when absent).
    pub votes: u8,

    pub cycle: CleaningCycle,
    pub odometry: OdometryAccumulator,
    completed_cycle: Option<CycleReport>,
    /// Latest frame reported a zero battery capacity.
    zero_capacity: bool,

    pub telemetry: TelemetryLedger,
    pub config: SystemConfig,
}

impl DeviceState {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            run_mode: RunMode::Sleeping,
            now_ms: 0,
            frame: None,
            votes: 0,
            cycle: CleaningCycle::default(),
            odometry: OdometryAccumulator::new(&config),
            completed_cycle: None,
            zero_capacity: false,
            telemetry: TelemetryLedger::new(),
            config,
        }
    }

    /// Record one poll result ahead of the FSM tick.
    ///
    /// A present frame refreshes the vote and feeds the odometer.  An
    /// absent frame clears both the frame and the vote.
    pub fn observe(&mut self, frame: Option<SensorFrame>, now_ms: u64) {
        self.now_ms = now_ms;
        self.frame = frame;
        self.votes = match &frame {
            Some(f) => {
                self.note_capacity(f.capacity_mah);
                self.odometry.update(f.left_encoder, f.right_encoder);
                CleaningEvidence::from_frame(f, &self.config).votes()
            }
            None => 0,
        };
    }

    /// Track zero-capacity readings; warns only when one begins.
    /// Returns `true` on that first zero frame.
    fn note_capacity(&mut self, capacity_mah: u16) -> bool {
        let was_zero = core::mem::replace(&mut self.zero_capacity, capacity_mah == 0);
        let began = self.zero_capacity && !was_zero;
        if began {
            warn!("battery capacity reads 0, percent forced to 0");
        }
        began
    }

    /// Copy the current frame and mode into the telemetry ledger.
    ///
    /// Battery channels keep their last value while no frame is available.
    pub fn refresh_telemetry(&mut self) {
        if let Some(f) = &self.frame {
            let ledger = &mut self.telemetry;
            ledger.observe(Channel::BatteryVoltage, Value::Number(i32::from(f.voltage_mv)));
            ledger.observe(Channel::BatteryCurrent, Value::Number(i32::from(f.current_ma)));
            ledger.observe(
                Channel::BatteryTemperature,
                Value::Number(i32::from(f.temperature_c)),
            );
            ledger.observe(Channel::BatteryCharge, Value::Number(i32::from(f.charge_mah)));
            ledger.observe(Channel::BatteryCapacity, Value::Number(i32::from(f.capacity_mah)));
            ledger.observe(
                Channel::BatteryPercent,
                Value::Number(i32::from(percent_remaining(f.charge_mah, f.capacity_mah))),
            );
            ledger.observe(Channel::ChargingState, Value::Charging(f.charging_state));
        }
        self.telemetry
            .observe(Channel::Status, Value::Status(self.run_mode));
    }

    /// Stamp the start of a cleaning cycle and zero the odometer.
    pub fn begin_cycle(&mut self) {
        self.cycle = CleaningCycle {
            start_ms: self.now_ms,
            end_ms: self.now_ms,
            duration_ms: 0,
        };
        self.odometry.reset();
        self.completed_cycle = None;
    }

    /// Close the running cycle and queue its report.
    pub fn finish_cycle(&mut self) -> CycleReport {
        self.cycle.end_ms = self.now_ms;
        self.cycle.duration_ms = self.cycle.end_ms.saturating_sub(self.cycle.start_ms);
        let report = CycleReport {
            duration_secs: self.cycle.duration_ms / 1000,
            distance_mm: self.odometry.odometer_mm(),
        };
        self.completed_cycle = Some(report);
        report
    }

    /// Take the report of a just-completed cycle.  Yields it only once.
    pub fn take_cycle_report(&mut self) -> Option<CycleReport> {
        self.completed_cycle.take()
    }
}
