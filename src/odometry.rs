//! Wheel-encoder odometry.
//!
//! The robot exposes one free-running 16-bit tick counter per wheel.  Each
//! poll we take the forward delta of both counters, average them, and
//! convert to millimetres:
//!
//! ```text
//!   distance_mm = round(avg_ticks × π × wheel_size_mm / ticks_per_rev)
//! ```
//!
//! The odometer is cleared at the start of every cleaning cycle; the last
//! raw counter values survive the reset so the next delta stays relative.

use log::debug;

use crate::config::SystemConfig;

/// Highest value a wheel counter reports before rolling over to zero.
pub const ENCODER_MAX: u16 = u16::MAX;

/// Forward ticks between two counter samples.
///
/// A current value below the previous one means the counter rolled over
/// the ceiling, and the delta becomes `(65535 − previous) + current`.
pub fn compute_delta(current: u16, previous: u16) -> u32 {
    if current < previous {
        u32::from(ENCODER_MAX - previous) + u32::from(current)
    } else {
        u32::from(current - previous)
    }
}

/// Cumulative per-cycle distance from successive encoder samples.
#[derive(Debug, Clone)]
pub struct OdometryAccumulator {
    mm_per_tick: f32,
    /// `None` until the first sample arrives.
    last: Option<(u16, u16)>,
    odometer_mm: u32,
}

impl OdometryAccumulator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            mm_per_tick: config.mm_per_tick(),
            last: None,
            odometer_mm: 0,
        }
    }

    /// Feed one pair of raw counters.  Returns the millimetres added.
    ///
    /// The very first sample only seeds the reference values.
    pub fn update(&mut self, left: u16, right: u16) -> u32 {
        let Some((prev_left, prev_right)) = self.last.replace((left, right)) else {
            debug!("odometry: seeded encoders L={left} R={right}");
            return 0;
        };

        let dl = compute_delta(left, prev_left);
        let dr = compute_delta(right, prev_right);
        let avg_ticks = (dl + dr) as f32 / 2.0;
        let step_mm = (avg_ticks * self.mm_per_tick).round() as u32;

        self.odometer_mm = self.odometer_mm.saturating_add(step_mm);
        if step_mm > 0 {
            debug!(
                "odometry: dL={dl} dR={dr} +{step_mm}mm total={}mm",
                self.odometer_mm
            );
        }
        step_mm
    }

    /// Zero the odometer without forgetting the reference counters.
    pub fn reset(&mut self) {
        self.odometer_mm = 0;
    }

    /// Distance accumulated since the last reset (mm).
    pub fn odometer_mm(&self) -> u32 {
        self.odometer_mm
    }
}
