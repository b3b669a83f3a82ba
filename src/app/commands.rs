//! Inbound commands to the engine.
//!
//! These represent actions requested by the outside world (message bus,
//! console) that the [`EngineService`](super::service::EngineService)
//! interprets and acts upon.

use core::fmt;
use core::str::FromStr;

use crate::error::PayloadError;

/// Commands that external adapters can send into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// Start a cleaning cycle.
    Clean,
    /// Send the robot back to its dock.
    Dock,
    /// Pause an active cleaning cycle.
    Stop,
    /// Set the robot's clock; payload `weekday,hh:mm`.
    SetTime,
    /// Clear the robot's weekly schedule.
    ResetSchedule,
    /// Soft-reset the robot.
    Reboot,
    /// Pulse the wake line.
    Wake,

    // Control-plane commands, handled outside the engine.
    /// Restart the bridge itself.
    Restart,
    /// Publish a status snapshot.
    Status,
    FirmwareUpdate,
    /// Apply bootstrap configuration; payload is opaque here.
    Bootstrap,
    ProvisionReset,
}

impl CommandId {
    pub const ALL: [CommandId; 12] = [
        Self::Clean,
        Self::Dock,
        Self::Stop,
        Self::SetTime,
        Self::ResetSchedule,
        Self::Reboot,
        Self::Wake,
        Self::Restart,
        Self::Status,
        Self::FirmwareUpdate,
        Self::Bootstrap,
        Self::ProvisionReset,
    ];

    /// Identifier used on the command channel.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dock => "dock",
            Self::Stop => "stop",
            Self::SetTime => "setTime",
            Self::ResetSchedule => "resetSchedule",
            Self::Reboot => "reboot",
            Self::Wake => "wake",
            Self::Restart => "restart",
            Self::Status => "status",
            Self::FirmwareUpdate => "firmwareUpdate",
            Self::Bootstrap => "bootstrap",
            Self::ProvisionReset => "provisionReset",
        }
    }

    /// Exact, case-sensitive lookup by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    /// True for commands that result in bytes on the robot's serial link.
    pub const fn is_device_actuation(self) -> bool {
        matches!(
            self,
            Self::Clean
                | Self::Dock
                | Self::Stop
                | Self::SetTime
                | Self::ResetSchedule
                | Self::Reboot
                | Self::Wake
        )
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// setTime payload
// ---------------------------------------------------------------------------

/// Day code as the robot expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    const NAMES: [(&'static str, Weekday); 7] = [
        ("sunday", Self::Sunday),
        ("monday", Self::Monday),
        ("tuesday", Self::Tuesday),
        ("wednesday", Self::Wednesday),
        ("thursday", Self::Thursday),
        ("friday", Self::Friday),
        ("saturday", Self::Saturday),
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl FromStr for Weekday {
    type Err = PayloadError;

    /// English day name, any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, day)| day)
            .ok_or(PayloadError::UnknownWeekday)
    }
}

/// Validated argument of `setTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTime {
    pub day: Weekday,
    /// 0–24 inclusive.
    pub hour: u8,
    /// 0–60 inclusive.
    pub minute: u8,
}

pub const MAX_HOUR: u8 = 24;
pub const MAX_MINUTE: u8 = 60;

/// Parse `weekday,hh:mm`.  Hour and minute take one or two digits.
pub fn parse_day_time(payload: &str) -> Result<DayTime, PayloadError> {
    let (day, clock) = payload.split_once(',').ok_or(PayloadError::Malformed)?;
    let (hour, minute) = clock.split_once(':').ok_or(PayloadError::Malformed)?;

    let day = day.parse::<Weekday>()?;
    let hour = parse_field(hour)?;
    let minute = parse_field(minute)?;

    if hour > MAX_HOUR {
        return Err(PayloadError::HourOutOfRange(hour));
    }
    if minute > MAX_MINUTE {
        return Err(PayloadError::MinuteOutOfRange(minute));
    }
    Ok(DayTime { day, hour, minute })
}

fn parse_field(digits: &str) -> Result<u8, PayloadError> {
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PayloadError::Malformed);
    }
    digits.parse().map_err(|_| PayloadError::Malformed)
}
