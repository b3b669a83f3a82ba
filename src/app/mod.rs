//! Application core: pure domain logic, zero I/O.
//!
//! Command translation and the engine service that ties decoding,
//! inference, and telemetry together.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod dispatch;
pub mod ports;
pub mod service;
