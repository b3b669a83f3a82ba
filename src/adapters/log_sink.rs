//! Log-based telemetry sink adapter.
//!
//! Implements [`TelemetrySink`] by writing every published reading to the
//! ESP-IDF logger (which goes to UART0 / USB-CDC in production).  Also used
//! as a fallback while the message bus is down.

use log::info;

use crate::app::ports::TelemetrySink;

/// Adapter that logs every `(channel, value)` pair to the serial console.
#[derive(Debug, Default)]
pub struct LogTelemetrySink {
    published: u32,
}

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readings logged since startup.
    pub fn published(&self) -> u32 {
        self.published
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, channel: &str, value: &str) {
        self.published = self.published.wrapping_add(1);
        info!("TELEM | {} = {}", channel, value);
    }
}

/// Fans one publish out to two sinks.
pub struct Tee<'a, A, B> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<A: TelemetrySink, B: TelemetrySink> TelemetrySink for Tee<'_, A, B> {
    fn publish(&mut self, channel: &str, value: &str) {
        self.first.publish(channel, value);
        self.second.publish(channel, value);
    }
}
