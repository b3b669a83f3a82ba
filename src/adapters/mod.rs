//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                  |
//! |------------|----------------|------------------------------|
//! | `serial`   | DevicePort     | Robot UART + wake GPIO       |
//! | `mqtt`     | TelemetrySink  | MQTT broker (esp-idf-svc)    |
//! |            | command source | `events` command queue       |
//! | `log_sink` | TelemetrySink  | Serial log output            |
//! | `time`     | clock          | ESP32 system timer           |

pub mod log_sink;
pub mod mqtt;
pub mod serial;
pub mod time;
