//! Port traits: the hexagonal boundary between the engine and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ EngineService (domain)
//! ```
//!
//! Driven adapters (serial link, telemetry publisher) implement these
//! traits.  The [`EngineService`](super::service::EngineService) consumes
//! them via generics, so the engine core never touches hardware directly.

// ───────────────────────────────────────────────────────────────
// Device port (driven adapter: domain ↔ robot serial link)
// ───────────────────────────────────────────────────────────────

/// The robot's serial link plus its wake line.
pub trait DevicePort {
    /// Send `request`, wait for the reply, and read up to `response.len()`
    /// bytes into `response`.  Returns the number of bytes read; a silent
    /// device reads 0.
    fn query(&mut self, request: &[u8], response: &mut [u8]) -> usize;

    /// Write one byte to the link.
    fn write_byte(&mut self, byte: u8);

    /// Hold the wake line low for `ms` milliseconds, then release it.
    fn pulse_wake(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink port (driven adapter: domain → message bus / log)
// ───────────────────────────────────────────────────────────────

/// Receives `(channel, value)` pairs the engine decided to publish.
/// Adapters decide where they go (MQTT topic, serial log, etc.).
pub trait TelemetrySink {
    fn publish(&mut self, channel: &str, value: &str);
}
