//! Mock hardware adapters for integration tests.
//!
//! Records every device call so tests can assert on the full command
//! history without touching a real UART, and scripts the robot's replies.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use roombridge::app::ports::{DevicePort, TelemetrySink};
use roombridge::protocol::{FRAME_LEN, QUERY_LEN, sensor_query};

// ── Device call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Query(Vec<u8>),
    Write(u8),
    Wake(u32),
}

// ── MockRobot ─────────────────────────────────────────────────

/// Scripted robot: each `query` pops the next reply (silence when empty).
#[derive(Default)]
pub struct MockRobot {
    pub calls: Vec<DeviceCall>,
    replies: VecDeque<Vec<u8>>,
}

#[allow(dead_code)]
impl MockRobot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&mut self, bytes: &[u8]) -> &mut Self {
        self.replies.push_back(bytes.to_vec());
        self
    }

    pub fn silent(&mut self) -> &mut Self {
        self.replies.push_back(Vec::new());
        self
    }

    /// Bytes written outside of polls, in order.
    pub fn written(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Write(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn wake_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::Wake(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DevicePort for MockRobot {
    fn query(&mut self, request: &[u8], response: &mut [u8]) -> usize {
        assert_eq!(request.len(), QUERY_LEN);
        assert_eq!(request, sensor_query());
        self.calls.push(DeviceCall::Query(request.to_vec()));
        let reply = self.replies.pop_front().unwrap_or_default();
        let n = reply.len().min(response.len());
        response[..n].copy_from_slice(&reply[..n]);
        n
    }

    fn write_byte(&mut self, byte: u8) {
        self.calls.push(DeviceCall::Write(byte));
    }

    fn pulse_wake(&mut self, ms: u32) {
        self.calls.push(DeviceCall::Wake(ms));
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub delays_ns: Vec<u32>,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays_ms(&self) -> Vec<u32> {
        self.delays_ns.iter().map(|ns| ns / 1_000_000).collect()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ns.push(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ns.push(ms * 1_000_000);
    }
}

// ── CollectingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub published: Vec<(String, String)>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values published on `channel`, oldest first.
    pub fn values(&self, channel: &str) -> Vec<&str> {
        self.published
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn last(&self, channel: &str) -> Option<&str> {
        self.values(channel).last().copied()
    }

    pub fn take(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.published)
    }
}

impl TelemetrySink for CollectingSink {
    fn publish(&mut self, channel: &str, value: &str) {
        self.published.push((channel.to_owned(), value.to_owned()));
    }
}

// ── Frame builder ─────────────────────────────────────────────

/// Raw reply bytes, field by field in wire order.
#[derive(Clone, Copy)]
pub struct Frame {
    pub charging: u8,
    pub voltage: u16,
    pub current: i16,
    pub temperature: i8,
    pub charge: u16,
    pub capacity: u16,
    pub encoders: (u16, u16),
    pub motors: [i16; 4],
    pub stasis: u8,
}

#[allow(dead_code)]
impl Frame {
    /// On the dock, fully charged, nothing moving.
    pub fn docked() -> Self {
        Self {
            charging: 2,
            voltage: 16_400,
            current: 150,
            temperature: 24,
            charge: 2600,
            capacity: 2700,
            encoders: (0, 0),
            motors: [0; 4],
            stasis: 0,
        }
    }

    /// Off the dock, discharging, all motors on, moving forward: 7 votes.
    pub fn cleaning() -> Self {
        Self {
            charging: 0,
            current: -1400,
            motors: [180, 170, 400, 60],
            stasis: 1,
            ..Self::docked()
        }
    }

    pub fn encoders(mut self, left: u16, right: u16) -> Self {
        self.encoders = (left, right);
        self
    }

    pub fn bytes(&self) -> [u8; FRAME_LEN] {
        let mut b = Vec::with_capacity(FRAME_LEN);
        b.push(0); // dirt
        b.extend_from_slice(&0i16.to_be_bytes()); // distance
        b.push(self.charging);
        b.extend_from_slice(&self.voltage.to_be_bytes());
        b.extend_from_slice(&self.current.to_be_bytes());
        b.push(self.temperature as u8);
        b.extend_from_slice(&self.charge.to_be_bytes());
        b.extend_from_slice(&self.capacity.to_be_bytes());
        b.extend_from_slice(&self.encoders.0.to_be_bytes());
        b.extend_from_slice(&self.encoders.1.to_be_bytes());
        for m in self.motors {
            b.extend_from_slice(&m.to_be_bytes());
        }
        b.push(self.stasis);
        b.try_into().expect("frame layout is FRAME_LEN bytes")
    }
}
