//! Delta filter: decides which observations are significant enough to publish.
//!
//! | Channel kind        | Published when                              |
//! |---------------------|---------------------------------------------|
//! | numeric             | never reported, or `|obs − rep| > min_delta`  |
//! | categorical         | never reported, or value changed            |
//! | cycle completion    | always, once per finished cycle             |
//!
//! Each published value becomes the new reported baseline, so an unchanged
//! value is emitted at most once.

use heapless::Vec;
use log::debug;

use crate::config::SystemConfig;
use crate::fsm::context::CycleReport;

use super::{Channel, Reading, TelemetryLedger, Value};

/// Upper bound on readings produced by one evaluation.
pub type ReadingBatch = Vec<Reading, { Channel::COUNT }>;

/// Per-channel significance thresholds.
#[derive(Debug, Clone, Copy)]
pub struct DeltaFilter {
    /// Indexed by `Channel as usize`; `None` means report on any change.
    min_delta: [Option<u32>; Channel::COUNT],
}

impl DeltaFilter {
    pub fn new(config: &SystemConfig) -> Self {
        let mut min_delta = [None; Channel::COUNT];
        min_delta[Channel::BatteryVoltage as usize] = Some(u32::from(config.min_delta_voltage_mv));
        min_delta[Channel::BatteryCurrent as usize] = Some(u32::from(config.min_delta_current_ma));
        min_delta[Channel::BatteryTemperature as usize] =
            Some(u32::from(config.min_delta_temperature_c));
        min_delta[Channel::BatteryCharge as usize] = Some(u32::from(config.min_delta_charge_mah));
        min_delta[Channel::BatteryCapacity as usize] =
            Some(u32::from(config.min_delta_capacity_mah));
        min_delta[Channel::BatteryPercent as usize] = Some(u32::from(config.min_delta_percent));
        Self { min_delta }
    }

    /// Whether `observed` differs enough from `reported` on `channel`.
    pub fn is_significant(&self, channel: Channel, observed: Value, reported: Option<Value>) -> bool {
        let Some(reported) = reported else {
            return true;
        };
        match (self.min_delta[channel as usize], observed, reported) {
            (Some(min), Value::Number(obs), Value::Number(rep)) => obs.abs_diff(rep) > min,
            _ => observed != reported,
        }
    }

    /// Compare observed against reported, advance the reported baseline for
    /// every emitted channel, and append the cycle-completion pair if given.
    pub fn evaluate(&self, ledger: &mut TelemetryLedger, cycle: Option<CycleReport>) -> ReadingBatch {
        let mut out = ReadingBatch::new();

        for channel in Channel::TRACKED {
            let Some(observed) = ledger.observed(channel) else {
                continue;
            };
            if self.is_significant(channel, observed, ledger.reported(channel)) {
                ledger.mark_reported(channel, observed);
                push(&mut out, Reading::new(channel, observed));
            }
        }

        if let Some(report) = cycle {
            debug!(
                "filter: cycle report {}s {}mm",
                report.duration_secs, report.distance_mm
            );
            let secs = i32::try_from(report.duration_secs).unwrap_or(i32::MAX);
            let mm = i32::try_from(report.distance_mm).unwrap_or(i32::MAX);
            push(&mut out, Reading::new(Channel::CleaningDuration, Value::Number(secs)));
            push(&mut out, Reading::new(Channel::CleaningDistance, Value::Number(mm)));
        }

        out
    }
}

fn push(out: &mut ReadingBatch, reading: Reading) {
    // Capacity equals the channel count, and each channel appears once.
    let pushed = out.push(reading);
    debug_assert!(pushed.is_ok(), "reading batch overflow");
}
