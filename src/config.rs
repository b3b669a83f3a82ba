//! System configuration parameters
//!
//! All tunable parameters for the bridge.  Loading and persisting them is
//! the job of the storage collaborator; the engine only consumes a
//! validated [`SystemConfig`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hardware floor for the spacing between opcode bytes.
pub const MIN_INTER_BYTE_DELAY_MS: u32 = 50;

/// Number of independent cleaning signals a frame can carry.
pub const MAX_CLEANING_VOTES: u8 = 7;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Polling ---
    /// Minimum dwell between two device polls (milliseconds).
    pub poll_interval_ms: u32,

    // --- Actuation ---
    /// Minimum spacing between consecutive device actions (milliseconds).
    pub inter_byte_delay_ms: u32,
    /// Length of the low pulse on the wake line (milliseconds).
    pub wake_pulse_ms: u32,

    // --- Run-state inference ---
    /// Votes at or above which an idle/sleeping device is considered cleaning.
    pub enter_cleaning_votes: u8,
    /// Votes at or below which a cleaning device is considered idle.
    pub exit_cleaning_votes: u8,
    /// Battery current (mA) below which the battery counts as discharging.
    pub discharge_current_ma: i16,
    /// Motor current (mA) a motor must exceed to count as running.
    pub motor_noise_ma: i16,

    // --- Odometry ---
    /// Wheel size term of the tick-to-millimetre factor (mm).
    pub wheel_size_mm: f32,
    /// Encoder ticks per wheel revolution.
    pub ticks_per_revolution: f32,

    // --- Telemetry delta thresholds ---
    pub min_delta_voltage_mv: u16,
    pub min_delta_current_ma: u16,
    pub min_delta_temperature_c: u16,
    pub min_delta_charge_mah: u16,
    pub min_delta_capacity_mah: u16,
    pub min_delta_percent: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Polling
            poll_interval_ms: 2000,

            // Actuation
            inter_byte_delay_ms: MIN_INTER_BYTE_DELAY_MS,
            wake_pulse_ms: 100,

            // Inference
            enter_cleaning_votes: 4,
            exit_cleaning_votes: 1,
            discharge_current_ma: -300,
            motor_noise_ma: 20,

            // Odometry (72 mm wheel, 508.8 ticks/rev)
            wheel_size_mm: 72.0,
            ticks_per_revolution: 508.8,

            // Telemetry
            min_delta_voltage_mv: 200,
            min_delta_current_ma: 512,
            min_delta_temperature_c: 2,
            min_delta_charge_mah: 50,
            min_delta_capacity_mah: 50,
            min_delta_percent: 1,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero"));
        }
        if self.inter_byte_delay_ms < MIN_INTER_BYTE_DELAY_MS {
            return Err(Error::Config("inter_byte_delay_ms below 50 ms hardware floor"));
        }
        if self.enter_cleaning_votes > MAX_CLEANING_VOTES {
            return Err(Error::Config("enter_cleaning_votes exceeds available signals"));
        }
        if self.exit_cleaning_votes >= self.enter_cleaning_votes {
            return Err(Error::Config("exit_cleaning_votes must be below enter_cleaning_votes"));
        }
        if !(self.wheel_size_mm > 0.0) || !(self.ticks_per_revolution > 0.0) {
            return Err(Error::Config("odometry factors must be positive"));
        }
        Ok(())
    }

    /// Millimetres travelled per encoder tick.
    pub fn mm_per_tick(&self) -> f32 {
        core::f32::consts::PI * self.wheel_size_mm / self.ticks_per_revolution
    }
}
