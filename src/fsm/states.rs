//! Concrete state handler functions and table builder.
//!
//! Each mode is defined by plain `fn` pointers over [`DeviceState`]; no
//! closures, no dynamic dispatch, no heap.
//!
//! ```text
//!  SLEEPING ──[frame]──────────────▶ IDLING
//!     │  ▲                            │  ▲
//!     │  └──────[no frame]────────────┘  │
//!     │                                  │
//!  [frame, votes ≥ enter]   [votes ≥ enter]  [votes ≤ exit]
//!     │                                  │  │
//!     ▼                                  ▼  │
//!  CLEANING ◀────────────────────────────┘  │
//!     │  └──────────────────────────────────┘
//!     └──[no frame]──▶ SLEEPING
//! ```

use super::context::DeviceState;
use super::{RunMode, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; RunMode::COUNT] {
    [
        // Index 0: Sleeping
        StateDescriptor {
            id: RunMode::Sleeping,
            name: "Sleeping",
            on_enter: Some(sleeping_enter),
            on_exit: None,
            on_update: sleeping_update,
        },
        // Index 1: Cleaning
        StateDescriptor {
            id: RunMode::Cleaning,
            name: "Cleaning",
            on_enter: Some(cleaning_enter),
            on_exit: Some(cleaning_exit),
            on_update: cleaning_update,
        },
        // Index 2: Idling
        StateDescriptor {
            id: RunMode::Idling,
            name: "Idling",
            on_enter: Some(idling_enter),
            on_exit: None,
            on_update: idling_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING: robot not answering polls
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_enter(_state: &mut DeviceState) {
    info!("SLEEPING: robot unresponsive, polling continues");
}

fn sleeping_update(state: &mut DeviceState) -> Option<RunMode> {
    if state.frame.is_none() {
        return None;
    }

    // A frame proves the robot is awake.  Strong evidence skips Idling.
    if state.votes >= state.config.enter_cleaning_votes {
        Some(RunMode::Cleaning)
    } else {
        Some(RunMode::Idling)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLING: awake, not cleaning
// ═══════════════════════════════════════════════════════════════════════════

fn idling_enter(state: &mut DeviceState) {
    info!("IDLING: awake, {} cleaning votes", state.votes);
}

fn idling_update(state: &mut DeviceState) -> Option<RunMode> {
    if state.frame.is_none() {
        return Some(RunMode::Sleeping);
    }

    if state.votes >= state.config.enter_cleaning_votes {
        info!(
            "IDLING: {} votes >= {} → cleaning",
            state.votes, state.config.enter_cleaning_votes
        );
        return Some(RunMode::Cleaning);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLEANING: cycle in progress, odometer running
// ═══════════════════════════════════════════════════════════════════════════

fn cleaning_enter(state: &mut DeviceState) {
    state.begin_cycle();
    info!("CLEANING: cycle started at t={}ms", state.cycle.start_ms);
}

fn cleaning_exit(state: &mut DeviceState) {
    info!(
        "CLEANING: left after {}mm",
        state.odometry.odometer_mm()
    );
}

fn cleaning_update(state: &mut DeviceState) -> Option<RunMode> {
    if state.frame.is_none() {
        warn!("CLEANING: robot stopped answering mid-cycle");
        return Some(RunMode::Sleeping);
    }

    // Between exit and enter thresholds the mode holds.
    if state.votes <= state.config.exit_cleaning_votes {
        let report = state.finish_cycle();
        info!(
            "CLEANING: cycle done, {}s {}mm",
            report.duration_secs, report.distance_mm
        );
        return Some(RunMode::Idling);
    }

    None
}
