//! Unified error types for the Roombridge firmware.
//!
//! A single `Error` enum that every core component converts into, keeping
//! the poll loop's error handling uniform.  All variants are `Copy` so they
//! can be handed back through the engine without allocation.  None of them
//! is fatal: the caller skips the current cycle and carries on.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the engine funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The poll response did not have the agreed frame length.
    /// The engine has already inferred SLEEPING; skip this cycle.
    FrameLengthMismatch { expected: usize, actual: usize },
    /// A command payload failed validation.  Nothing was sent to the device.
    CommandPayloadInvalid(PayloadError),
    /// A categorical byte outside the documented set, surfaced only by the
    /// strict `TryFrom<u8>` conversions.  The decoder itself maps such bytes
    /// to an `Unknown` variant instead.
    UnknownCategoricalValue { field: &'static str, raw: u8 },
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameLengthMismatch { expected, actual } => {
                write!(f, "frame length mismatch: expected {expected} bytes, got {actual}")
            }
            Self::CommandPayloadInvalid(e) => write!(f, "invalid command payload: {e}"),
            Self::UnknownCategoricalValue { field, raw } => {
                write!(f, "unknown {field} value {raw}")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command payload errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// The command requires a payload and none was supplied.
    Missing,
    /// The payload does not have the `weekday,hh:mm` shape.
    Malformed,
    /// The weekday is not an English day name.
    UnknownWeekday,
    /// Hour outside `0..=24`.
    HourOutOfRange(u8),
    /// Minute outside `0..=60`.
    MinuteOutOfRange(u8),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "payload missing"),
            Self::Malformed => write!(f, "expected `weekday,hh:mm`"),
            Self::UnknownWeekday => write!(f, "unknown weekday"),
            Self::HourOutOfRange(h) => write!(f, "hour {h} out of range"),
            Self::MinuteOutOfRange(m) => write!(f, "minute {m} out of range"),
        }
    }
}

impl From<PayloadError> for Error {
    fn from(e: PayloadError) -> Self {
        Self::CommandPayloadInvalid(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
