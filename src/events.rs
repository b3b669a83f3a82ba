//! Inbound command queue.
//!
//! Commands arrive on the message-bus client's callback thread; the engine
//! lives on the main loop.  A bounded `embassy-sync` channel bridges the two
//! without heap allocation, so the main loop stays the single owner of the
//! engine.
//!
//! ```text
//! ┌──────────────┐  InboundCommand  ┌──────────────┐
//! │  MQTT task   │─────────────────▶│  Main Loop   │
//! │  (callback)  │                  │  (consumer)  │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use log::warn;

use crate::app::commands::CommandId;

/// Longest payload carried through the queue.  `setTime` needs 16.
pub const PAYLOAD_CAP: usize = 64;

/// Channel depth for pending commands.
const COMMAND_DEPTH: usize = 8;

/// A command waiting for the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub id: CommandId,
    pub payload: Option<String<PAYLOAD_CAP>>,
}

impl InboundCommand {
    /// Build a command, rejecting payloads longer than [`PAYLOAD_CAP`].
    pub fn new(id: CommandId, payload: Option<&str>) -> Option<Self> {
        let payload = match payload {
            Some(p) => Some(String::try_from(p).ok()?),
            None => None,
        };
        Some(Self { id, payload })
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

/// Message bus → main loop.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, InboundCommand, COMMAND_DEPTH> =
    Channel::new();

/// Enqueue a command.  Returns `false` if the queue is full or the payload
/// does not fit (command dropped).
pub fn push_command(id: CommandId, payload: Option<&str>) -> bool {
    let Some(cmd) = InboundCommand::new(id, payload) else {
        warn!("events: {id} payload exceeds {PAYLOAD_CAP} bytes, dropped");
        return false;
    };
    if COMMAND_CHANNEL.try_send(cmd).is_err() {
        warn!("events: command queue full, {id} dropped");
        return false;
    }
    true
}

/// Pop the next pending command, if any.
pub fn pop_command() -> Option<InboundCommand> {
    COMMAND_CHANNEL.try_receive().ok()
}

/// Drain all pending commands into a callback, in FIFO order.
pub fn drain_commands(mut handler: impl FnMut(InboundCommand)) {
    while let Some(cmd) = pop_command() {
        handler(cmd);
    }
}
