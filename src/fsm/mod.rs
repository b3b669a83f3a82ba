//! Run-state inference engine.
//!
//! Function-pointer state table, one row per run mode:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  StateTable                                               │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ RunMode  │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Sleeping │ fn(state) │ —        │ fn(state)->Option │  │
//! │  │ Cleaning │ fn(state) │ fn(state)│ fn(state)->Option │  │
//! │  │ Idling   │ fn(state) │ —        │ fn(state)->Option │  │
//! │  └──────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Each poll the engine calls `on_update` for the **current** mode with the
//! freshly observed [`DeviceState`].  If it returns `Some(next)`, the engine
//! runs `on_exit` for the current mode, records the new mode, then runs
//! `on_enter` for the next.  The current mode itself lives in
//! `DeviceState::run_mode`, so there is exactly one copy of it.

pub mod context;
pub mod states;
pub mod vote;

use core::fmt;

use context::DeviceState;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Run mode
// ---------------------------------------------------------------------------

/// Coarse operating state inferred from the robot's telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RunMode {
    Sleeping = 0,
    Cleaning = 1,
    Idling = 2,
}

impl RunMode {
    /// Total number of modes, used to size the table array.
    pub const COUNT: usize = 3;

    /// Telemetry label published on `client/status`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sleeping => "sleeping",
            Self::Cleaning => "cleaning",
            Self::Idling => "idling",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut DeviceState);

/// Signature for the per-poll update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut DeviceState) -> Option<RunMode>;

/// Static descriptor for a single run mode.
pub struct StateDescriptor {
    pub id: RunMode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The inference state machine.
pub struct Fsm {
    /// Fixed-size table indexed by `RunMode as usize`.
    table: [StateDescriptor; RunMode::COUNT],
    /// Polls evaluated since startup.
    tick_count: u64,
    /// Poll count at which the current mode was entered.
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; RunMode::COUNT]) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, row)| row.id as usize == i),
            "state table rows out of RunMode order"
        );
        Self {
            table,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for `state.run_mode`.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, state: &mut DeviceState) {
        let row = &self.table[state.run_mode as usize];
        info!("FSM starting in mode: {}", row.name);
        if let Some(enter) = row.on_enter {
            enter(state);
        }
    }

    /// Evaluate one poll.
    ///
    /// Returns the `(from, to)` pair when the mode changed.
    pub fn tick(&mut self, state: &mut DeviceState) -> Option<(RunMode, RunMode)> {
        self.tick_count += 1;
        let from = state.run_mode;
        let next = (self.table[from as usize].on_update)(state)?;
        if next == from {
            return None;
        }
        self.transition(next, state);
        Some((from, next))
    }

    /// Jump to `next` without a vote (explicit wake / reboot commands).
    /// Returns `true` when the mode actually changed.
    pub fn force_transition(&mut self, next: RunMode, state: &mut DeviceState) -> bool {
        if next == state.run_mode {
            return false;
        }
        self.transition(next, state);
        true
    }

    /// How many polls the engine has spent in the current mode.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next: RunMode, state: &mut DeviceState) {
        let from = state.run_mode;
        info!(
            "FSM transition: {} -> {}",
            self.table[from as usize].name, self.table[next as usize].name
        );

        if let Some(exit) = self.table[from as usize].on_exit {
            exit(state);
        }

        state.run_mode = next;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[next as usize].on_enter {
            enter(state);
        }
    }
}
