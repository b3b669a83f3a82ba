//! Command dispatcher: turns a [`CommandId`] into an ordered actuation.
//!
//! The dispatcher is pure.  It looks at the current [`RunMode`], validates
//! the payload, and returns what should happen; it never touches the serial
//! link and never sleeps.  Playback belongs to
//! [`EngineService::execute`](super::service::EngineService::execute).
//!
//! ```text
//!  clean          [wake]  START CLEAN
//!  dock           [wake]  START SEEK_DOCK
//!  stop           START CLEAN              (CLEANING only)
//!  setTime        START SET_DAY_TIME d h m
//!  resetSchedule  START SCHEDULE 0 × 15
//!  reboot         START RESET              → SLEEPING
//!  wake           wake                     → IDLING (SLEEPING only)
//! ```

use heapless::Vec;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::{PayloadError, Result};
use crate::fsm::RunMode;
use crate::protocol::{
    OP_CLEAN, OP_RESET, OP_SCHEDULE, OP_SEEK_DOCK, OP_SET_DAY_TIME, OP_START, SCHEDULE_DATA_LEN,
};

use super::commands::{CommandId, parse_day_time};

/// Longest sequence any command produces, with headroom.
pub const MAX_ACTIONS: usize = 24;

/// One step of an actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    /// Pulse the wake line low for the given milliseconds.
    WakePulse(u32),
    /// Write one byte to the serial link.
    Write(u8),
}

/// Ordered device actions with a minimum gap between consecutive steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actuation {
    actions: Vec<DeviceAction, MAX_ACTIONS>,
    spacing_ms: u32,
}

impl Actuation {
    pub fn new(spacing_ms: u32) -> Self {
        Self {
            actions: Vec::new(),
            spacing_ms,
        }
    }

    fn push(&mut self, action: DeviceAction) {
        let pushed = self.actions.push(action);
        debug_assert!(pushed.is_ok(), "actuation longer than {MAX_ACTIONS}");
    }

    fn write_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(DeviceAction::Write(b));
        }
    }

    pub fn actions(&self) -> &[DeviceAction] {
        &self.actions
    }

    /// Minimum delay between consecutive actions (ms).
    pub fn spacing_ms(&self) -> u32 {
        self.spacing_ms
    }

    /// Only the serial bytes, in order.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.actions.iter().filter_map(|a| match a {
            DeviceAction::Write(b) => Some(*b),
            DeviceAction::WakePulse(_) => None,
        })
    }

    pub fn starts_with_wake(&self) -> bool {
        matches!(self.actions.first(), Some(DeviceAction::WakePulse(_)))
    }
}

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Play `actuation`; afterwards force the run mode to `transition`.
    Actuate {
        actuation: Actuation,
        transition: Option<RunMode>,
    },
    /// `stop` while not cleaning.  Nothing written.
    NothingToStop,
    /// `wake` while already awake.  Nothing written.
    AlreadyAwake,
    /// Not a device command; handled by an outside collaborator.
    ControlPlane(CommandId),
}

/// Stateless translator from commands to actuations.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    spacing_ms: u32,
    wake_pulse_ms: u32,
}

impl Dispatcher {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            spacing_ms: config.inter_byte_delay_ms,
            wake_pulse_ms: config.wake_pulse_ms,
        }
    }

    /// Translate `id` given the current `mode`.
    ///
    /// Only `setTime` can fail; on failure nothing is produced.
    pub fn dispatch(&self, id: CommandId, payload: Option<&str>, mode: RunMode) -> Result<DispatchOutcome> {
        let mut act = Actuation::new(self.spacing_ms);
        let transition = match id {
            CommandId::Clean | CommandId::Dock => {
                if mode == RunMode::Sleeping {
                    act.push(DeviceAction::WakePulse(self.wake_pulse_ms));
                }
                let op = if id == CommandId::Clean { OP_CLEAN } else { OP_SEEK_DOCK };
                act.write_all(&[OP_START, op]);
                None
            }
            CommandId::Stop => {
                if mode != RunMode::Cleaning {
                    info!("dispatch: stop ignored while {mode}");
                    return Ok(DispatchOutcome::NothingToStop);
                }
                act.write_all(&[OP_START, OP_CLEAN]);
                None
            }
            CommandId::SetTime => {
                let dt = payload
                    .ok_or(PayloadError::Missing)
                    .and_then(parse_day_time)
                    .inspect_err(|e| warn!("dispatch: setTime rejected: {e}"))?;
                act.write_all(&[OP_START, OP_SET_DAY_TIME, dt.day.code(), dt.hour, dt.minute]);
                None
            }
            CommandId::ResetSchedule => {
                act.write_all(&[OP_START, OP_SCHEDULE]);
                act.write_all(&[0; SCHEDULE_DATA_LEN]);
                None
            }
            CommandId::Reboot => {
                act.write_all(&[OP_START, OP_RESET]);
                Some(RunMode::Sleeping)
            }
            CommandId::Wake => {
                if mode != RunMode::Sleeping {
                    info!("dispatch: wake ignored while {mode}");
                    return Ok(DispatchOutcome::AlreadyAwake);
                }
                act.push(DeviceAction::WakePulse(self.wake_pulse_ms));
                Some(RunMode::Idling)
            }
            CommandId::Restart
            | CommandId::Status
            | CommandId::FirmwareUpdate
            | CommandId::Bootstrap
            | CommandId::ProvisionReset => return Ok(DispatchOutcome::ControlPlane(id)),
        };

        info!("dispatch: {id} → {} actions", act.actions().len());
        Ok(DispatchOutcome::Actuate {
            actuation: act,
            transition,
        })
    }
}
