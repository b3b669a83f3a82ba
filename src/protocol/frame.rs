//! Fixed-layout sensor frame decoder.
//!
//! Wire format (reply to [`sensor_query`](super::sensor_query)):
//! ```text
//! ┌──────┬──────────┬────┬─────────┬─────────┬──────┬─────────┬──────────┐
//! │ dirt │ distance │ cs │ voltage │ current │ temp │ charge  │ capacity │
//! │ u8   │ i16      │ u8 │ u16     │ i16     │ i8   │ u16     │ u16      │
//! ├──────┴──────────┴────┴─────────┴─────────┴──────┴─────────┴──────────┤
//! │ enc L u16 │ enc R u16 │ I wheel L │ I wheel R │ I main │ I side │ st │
//! │           │           │ i16       │ i16       │ i16    │ i16    │ u8 │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multi-byte fields are big-endian (high byte first).  Decoding is total
//! for any buffer of exactly [`FRAME_LEN`] bytes; every other length is
//! rejected without producing a frame.

use core::fmt;

use log::debug;

use crate::error::{Error, Result};

/// Size of one poll reply in bytes.
pub const FRAME_LEN: usize = 26;

// Byte offsets within the frame.
const OFF_DIRT: usize = 0;
const OFF_DISTANCE: usize = 1;
const OFF_CHARGING_STATE: usize = 3;
const OFF_VOLTAGE: usize = 4;
const OFF_CURRENT: usize = 6;
const OFF_TEMPERATURE: usize = 8;
const OFF_CHARGE: usize = 9;
const OFF_CAPACITY: usize = 11;
const OFF_LEFT_ENCODER: usize = 13;
const OFF_RIGHT_ENCODER: usize = 15;
const OFF_LEFT_MOTOR: usize = 17;
const OFF_RIGHT_MOTOR: usize = 19;
const OFF_MAIN_BRUSH: usize = 21;
const OFF_SIDE_BRUSH: usize = 23;
const OFF_STASIS: usize = 25;

// ---------------------------------------------------------------------------
// Charging state
// ---------------------------------------------------------------------------

/// Charging-state code reported by the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargingState {
    NotCharging,
    Reconditioning,
    Full,
    Trickle,
    Waiting,
    Fault,
    /// Undocumented code; the raw byte is kept for diagnostics.
    Unknown(u8),
}

impl ChargingState {
    /// Total mapping from the wire byte.
    pub const fn from_code(raw: u8) -> Self {
        match raw {
            0 => Self::NotCharging,
            1 => Self::Reconditioning,
            2 => Self::Full,
            3 => Self::Trickle,
            4 => Self::Waiting,
            5 => Self::Fault,
            other => Self::Unknown(other),
        }
    }

    /// Telemetry label published on `sensor/chargingState`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotCharging => "notCharging",
            Self::Reconditioning => "reconditioning",
            Self::Full => "full",
            Self::Trickle => "trickle",
            Self::Waiting => "waiting",
            Self::Fault => "fault",
            Self::Unknown(_) => "unknown",
        }
    }

    /// True while the robot draws on its battery rather than the dock.
    pub const fn is_off_charger(self) -> bool {
        matches!(self, Self::NotCharging | Self::Waiting)
    }
}

impl TryFrom<u8> for ChargingState {
    type Error = Error;

    /// Strict conversion: undocumented codes are an error here.
    fn try_from(raw: u8) -> Result<Self> {
        match Self::from_code(raw) {
            Self::Unknown(raw) => Err(Error::UnknownCategoricalValue {
                field: "charging state",
                raw,
            }),
            known => Ok(known),
        }
    }
}

impl fmt::Display for ChargingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Sensor frame
// ---------------------------------------------------------------------------

/// One decoded poll result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    pub dirt_level: u8,
    /// Distance hint since the previous query (mm).
    pub distance_mm: i16,
    pub charging_state: ChargingState,
    pub voltage_mv: u16,
    /// Negative while discharging.
    pub current_ma: i16,
    pub temperature_c: i8,
    pub charge_mah: u16,
    pub capacity_mah: u16,
    pub left_encoder: u16,
    pub right_encoder: u16,
    pub left_motor_ma: i16,
    pub right_motor_ma: i16,
    pub main_brush_ma: i16,
    pub side_brush_ma: i16,
    /// Bit 0: caster toggling (forward motion), bit 1: stasis disabled.
    pub stasis: u8,
}

impl SensorFrame {
    /// Motor currents in a fixed order: left wheel, right wheel, main brush, side brush.
    pub fn motor_currents(&self) -> [i16; 4] {
        [
            self.left_motor_ma,
            self.right_motor_ma,
            self.main_brush_ma,
            self.side_brush_ma,
        ]
    }

    /// Stasis sensor reports the robot moving forward.
    pub fn moving_forward(&self) -> bool {
        self.stasis & 0b01 != 0 && self.stasis & 0b10 == 0
    }
}

/// Decode one frame.
///
/// Fails with [`Error::FrameLengthMismatch`] unless `buf` is exactly
/// [`FRAME_LEN`] bytes.  No retry happens here; the caller re-polls.
pub fn decode_frame(buf: &[u8]) -> Result<SensorFrame> {
    let Ok(raw) = <&[u8; FRAME_LEN]>::try_from(buf) else {
        return Err(Error::FrameLengthMismatch {
            expected: FRAME_LEN,
            actual: buf.len(),
        });
    };

    let charging_state = ChargingState::from_code(raw[OFF_CHARGING_STATE]);
    if let ChargingState::Unknown(code) = charging_state {
        debug!("frame: undocumented charging state {code}");
    }

    Ok(SensorFrame {
        dirt_level: raw[OFF_DIRT],
        distance_mm: be_i16(raw, OFF_DISTANCE),
        charging_state,
        voltage_mv: be_u16(raw, OFF_VOLTAGE),
        current_ma: be_i16(raw, OFF_CURRENT),
        temperature_c: raw[OFF_TEMPERATURE] as i8,
        charge_mah: be_u16(raw, OFF_CHARGE),
        capacity_mah: be_u16(raw, OFF_CAPACITY),
        left_encoder: be_u16(raw, OFF_LEFT_ENCODER),
        right_encoder: be_u16(raw, OFF_RIGHT_ENCODER),
        left_motor_ma: be_i16(raw, OFF_LEFT_MOTOR),
        right_motor_ma: be_i16(raw, OFF_RIGHT_MOTOR),
        main_brush_ma: be_i16(raw, OFF_MAIN_BRUSH),
        side_brush_ma: be_i16(raw, OFF_SIDE_BRUSH),
        stasis: raw[OFF_STASIS],
    })
}

#[inline]
fn be_u16(raw: &[u8; FRAME_LEN], at: usize) -> u16 {
    (u16::from(raw[at]) << 8) | u16::from(raw[at + 1])
}

#[inline]
fn be_i16(raw: &[u8; FRAME_LEN], at: usize) -> i16 {
    be_u16(raw, at) as i16
}
