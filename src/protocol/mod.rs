//! Robot Open Interface wire protocol.
//!
//! Outbound traffic is single opcode bytes (plus data bytes for a few
//! opcodes).  Inbound traffic is the reply to one query-list request:
//! a fixed-layout frame whose shape is decided by the packet ids we ask for.
//!
//! ```text
//!  poll:   [149][N][id_1]..[id_N]          ──▶ robot
//!  reply:  [packet id_1 bytes]..[id_N]     ◀── robot   (FRAME_LEN bytes)
//! ```

pub mod frame;

pub use frame::{ChargingState, SensorFrame, FRAME_LEN, decode_frame};

// ── Opcodes ──────────────────────────────────────────────────

/// Start the Open Interface (enters Passive mode).
pub const OP_START: u8 = 128;
/// Start cleaning; pauses an active cycle when sent while cleaning.
pub const OP_CLEAN: u8 = 135;
/// Seek the dock.
pub const OP_SEEK_DOCK: u8 = 143;
/// Query a list of sensor packets.
pub const OP_QUERY_LIST: u8 = 149;
/// Set the weekly cleaning schedule (15 data bytes follow).
pub const OP_SCHEDULE: u8 = 167;
/// Set day and time (3 data bytes follow).
pub const OP_SET_DAY_TIME: u8 = 168;
/// Soft reset; the robot reboots as if the battery had been reinserted.
pub const OP_RESET: u8 = 7;

/// Data bytes following [`OP_SCHEDULE`].
pub const SCHEDULE_DATA_LEN: usize = 15;

// ── Sensor packet ids (order defines the frame layout) ──────

pub const PKT_DIRT_DETECT: u8 = 15;
pub const PKT_DISTANCE: u8 = 19;
pub const PKT_CHARGING_STATE: u8 = 21;
pub const PKT_VOLTAGE: u8 = 22;
pub const PKT_CURRENT: u8 = 23;
pub const PKT_TEMPERATURE: u8 = 24;
pub const PKT_CHARGE: u8 = 25;
pub const PKT_CAPACITY: u8 = 26;
pub const PKT_LEFT_ENCODER: u8 = 43;
pub const PKT_RIGHT_ENCODER: u8 = 44;
pub const PKT_LEFT_MOTOR_CURRENT: u8 = 54;
pub const PKT_RIGHT_MOTOR_CURRENT: u8 = 55;
pub const PKT_MAIN_BRUSH_CURRENT: u8 = 56;
pub const PKT_SIDE_BRUSH_CURRENT: u8 = 57;
pub const PKT_STASIS: u8 = 58;

/// Packet ids requested on every poll, in frame order.
pub const SENSOR_PACKETS: [u8; 15] = [
    PKT_DIRT_DETECT,
    PKT_DISTANCE,
    PKT_CHARGING_STATE,
    PKT_VOLTAGE,
    PKT_CURRENT,
    PKT_TEMPERATURE,
    PKT_CHARGE,
    PKT_CAPACITY,
    PKT_LEFT_ENCODER,
    PKT_RIGHT_ENCODER,
    PKT_LEFT_MOTOR_CURRENT,
    PKT_RIGHT_MOTOR_CURRENT,
    PKT_MAIN_BRUSH_CURRENT,
    PKT_SIDE_BRUSH_CURRENT,
    PKT_STASIS,
];

/// Length of the poll request: opcode, count, ids.
pub const QUERY_LEN: usize = 2 + SENSOR_PACKETS.len();

/// Build the query-list request whose reply is one [`SensorFrame`].
pub const fn sensor_query() -> [u8; QUERY_LEN] {
    let mut out = [0u8; QUERY_LEN];
    out[0] = OP_QUERY_LIST;
    out[1] = SENSOR_PACKETS.len() as u8;
    let mut i = 0;
    while i < SENSOR_PACKETS.len() {
        out[2 + i] = SENSOR_PACKETS[i];
        i += 1;
    }
    out
}

/// Reply size in bytes of a single sensor packet.
pub const fn packet_len(id: u8) -> usize {
    match id {
        PKT_DIRT_DETECT | PKT_CHARGING_STATE | PKT_TEMPERATURE | PKT_STASIS => 1,
        _ => 2,
    }
}
