//! GPIO / peripheral pin assignments for the bridge board.
//!
//! Single source of truth: every adapter references this module rather than
//! hard-coding pin numbers.  The robot's mini-DIN port is level-shifted to
//! 3.3 V on the board; pin numbers are ESP32-S3 GPIOs.

// ---------------------------------------------------------------------------
// Robot serial link (mini-DIN pins 3/4)
// ---------------------------------------------------------------------------

/// UART peripheral dedicated to the robot (UART0 stays on the USB console).
pub const ROBOT_UART_NUM: i32 = 1;
/// ESP TX → robot RXD.
pub const ROBOT_UART_TX_GPIO: i32 = 17;
/// Robot TXD → ESP RX.
pub const ROBOT_UART_RX_GPIO: i32 = 18;
/// Default Open Interface baud rate.
pub const ROBOT_UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// Wake line (mini-DIN pin 5, BRC)
// ---------------------------------------------------------------------------

/// Open-drain output; a low pulse wakes a sleeping robot.
pub const ROBOT_WAKE_GPIO: i32 = 4;
