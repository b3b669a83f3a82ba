//! Engine service, the hexagonal core.
//!
//! [`EngineService`] owns the FSM, the device state, the delta filter, and
//! the dispatcher.  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!  DevicePort ◀──▶│        EngineService        │──▶ TelemetrySink
//!                 │ decode · FSM · filter · cmd │
//!  DelayNs    ◀───│                             │
//!                 └─────────────────────────────┘
//! ```

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::SystemConfig;
use crate::error::Result;
use crate::fsm::context::{CleaningCycle, DeviceState};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, RunMode};
use crate::protocol::{FRAME_LEN, decode_frame, sensor_query};
use crate::telemetry::filter::DeltaFilter;
use crate::telemetry::{Reading, percent_remaining};

use super::commands::CommandId;
use super::dispatch::{Actuation, DeviceAction, DispatchOutcome, Dispatcher};
use super::ports::{DevicePort, TelemetrySink};

/// Channel carrying the JSON answer to the `status` command.
pub const STATUS_REPORT_CHANNEL: &str = "client/statusReport";

/// Read slack beyond one frame, so over-long replies are detected.
const RESPONSE_SLACK: usize = 8;

// ───────────────────────────────────────────────────────────────
// Status report
// ───────────────────────────────────────────────────────────────

/// Snapshot answered on the `status` command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub mode: RunMode,
    pub polls_in_mode: u64,
    pub votes: u8,
    pub odometer_mm: u32,
    pub cycle: CleaningCycle,
    pub battery: Option<BatteryReport>,
    pub charging_state: Option<&'static str>,
    pub malformed_polls: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryReport {
    pub voltage_mv: u16,
    pub current_ma: i16,
    pub temperature_c: i8,
    pub charge_mah: u16,
    pub capacity_mah: u16,
    pub percent: u8,
}

impl StatusReport {
    pub fn to_json(&self) -> serde_json::Result<std::string::String> {
        serde_json::to_string(self)
    }
}

// ───────────────────────────────────────────────────────────────
// EngineService
// ───────────────────────────────────────────────────────────────

/// Orchestrates polling, inference, telemetry and commands.
pub struct EngineService {
    fsm: Fsm,
    state: DeviceState,
    filter: DeltaFilter,
    dispatcher: Dispatcher,
    last_poll_ms: Option<u64>,
    malformed_polls: u64,
}

impl EngineService {
    /// Construct the service from a validated configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fsm: Fsm::new(build_state_table()),
            filter: DeltaFilter::new(&config),
            dispatcher: Dispatcher::new(&config),
            state: DeviceState::new(config),
            last_poll_ms: None,
            malformed_polls: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial mode (SLEEPING) and publish it.
    pub fn start(&mut self, sink: &mut impl TelemetrySink) {
        self.fsm.start(&mut self.state);
        self.publish(sink);
        info!("EngineService started in {}", self.state.run_mode);
    }

    // ── Polling ───────────────────────────────────────────────

    /// True once the configured dwell has passed since the last poll.
    pub fn poll_due(&self, now_ms: u64) -> bool {
        match self.last_poll_ms {
            None => true,
            Some(last) => {
                now_ms.saturating_sub(last) >= u64::from(self.state.config.poll_interval_ms)
            }
        }
    }

    /// Query the robot once and feed the reply through [`ingest`](Self::ingest).
    pub fn poll(
        &mut self,
        link: &mut impl DevicePort,
        now_ms: u64,
        sink: &mut impl TelemetrySink,
    ) -> Result<Option<(RunMode, RunMode)>> {
        let mut buf = [0u8; FRAME_LEN + RESPONSE_SLACK];
        let n = link.query(&sensor_query(), &mut buf).min(buf.len());
        self.ingest(&buf[..n], now_ms, sink)
    }

    /// Run one poll result through decode → vote → FSM → filter → sink.
    ///
    /// A reply of the wrong length still advances the engine (the robot is
    /// taken to be asleep) before the decode error is returned.
    pub fn ingest(
        &mut self,
        response: &[u8],
        now_ms: u64,
        sink: &mut impl TelemetrySink,
    ) -> Result<Option<(RunMode, RunMode)>> {
        self.last_poll_ms = Some(now_ms);

        let decoded = decode_frame(response);
        let frame = match &decoded {
            Ok(frame) => Some(*frame),
            Err(e) if response.is_empty() => {
                debug!("poll: no reply ({e})");
                None
            }
            Err(e) => {
                self.malformed_polls += 1;
                warn!("poll: {e}");
                None
            }
        };

        self.state.observe(frame, now_ms);
        if frame.is_some() {
            debug!("poll: {} votes in {}", self.state.votes, self.state.run_mode);
        }
        let transition = self.fsm.tick(&mut self.state);
        self.publish(sink);

        decoded.map(|_| transition)
    }

    // ── Command handling ──────────────────────────────────────

    /// Dispatch a command, play its actuation, then apply any forced mode
    /// change and publish the result.
    ///
    /// `status` is answered here with a JSON report; the other control-plane
    /// commands are returned untouched for the caller.
    pub fn handle_command(
        &mut self,
        id: CommandId,
        payload: Option<&str>,
        link: &mut impl DevicePort,
        delay: &mut impl DelayNs,
        sink: &mut impl TelemetrySink,
    ) -> Result<DispatchOutcome> {
        let outcome = self.dispatcher.dispatch(id, payload, self.state.run_mode)?;

        match &outcome {
            DispatchOutcome::Actuate {
                actuation,
                transition,
            } => {
                Self::execute(actuation, link, delay);
                if let Some(next) = *transition {
                    if self.fsm.force_transition(next, &mut self.state) {
                        info!("command {id} forced {next}");
                    }
                    self.publish(sink);
                }
            }
            DispatchOutcome::ControlPlane(CommandId::Status) => {
                self.publish_status_report(sink);
            }
            DispatchOutcome::NothingToStop
            | DispatchOutcome::AlreadyAwake
            | DispatchOutcome::ControlPlane(_) => {}
        }

        Ok(outcome)
    }

    /// Play an actuation on the link, waiting `spacing_ms` between steps.
    pub fn execute(actuation: &Actuation, link: &mut impl DevicePort, delay: &mut impl DelayNs) {
        for (i, action) in actuation.actions().iter().enumerate() {
            if i > 0 {
                delay.delay_ms(actuation.spacing_ms());
            }
            match *action {
                DeviceAction::WakePulse(ms) => link.pulse_wake(ms),
                DeviceAction::Write(byte) => link.write_byte(byte),
            }
        }
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Forget what was published and send every observed channel again
    /// (e.g. after the message bus reconnects).
    pub fn republish_all(&mut self, sink: &mut impl TelemetrySink) {
        self.state.telemetry.clear_reported();
        self.publish(sink);
    }

    pub fn status_report(&self) -> StatusReport {
        let battery = self.state.frame.map(|f| BatteryReport {
            voltage_mv: f.voltage_mv,
            current_ma: f.current_ma,
            temperature_c: f.temperature_c,
            charge_mah: f.charge_mah,
            capacity_mah: f.capacity_mah,
            percent: percent_remaining(f.charge_mah, f.capacity_mah),
        });
        StatusReport {
            mode: self.state.run_mode,
            polls_in_mode: self.fsm.ticks_in_current_state(),
            votes: self.state.votes,
            odometer_mm: self.state.odometry.odometer_mm(),
            cycle: self.state.cycle,
            battery,
            charging_state: self.state.frame.map(|f| f.charging_state.name()),
            malformed_polls: self.malformed_polls,
        }
    }

    fn publish_status_report(&self, sink: &mut impl TelemetrySink) {
        match self.status_report().to_json() {
            Ok(json) => sink.publish(STATUS_REPORT_CHANNEL, &json),
            Err(e) => warn!("status report serialization failed: {e}"),
        }
    }

    fn publish(&mut self, sink: &mut impl TelemetrySink) {
        self.state.refresh_telemetry();
        let cycle = self.state.take_cycle_report();
        for reading in self.filter.evaluate(&mut self.state.telemetry, cycle) {
            emit(sink, reading);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn run_mode(&self) -> RunMode {
        self.state.run_mode
    }

    pub fn odometer_mm(&self) -> u32 {
        self.state.odometry.odometer_mm()
    }
}

fn emit(sink: &mut impl TelemetrySink, reading: Reading) {
    let mut text: String<16> = String::new();
    if write!(text, "{}", reading.value).is_ok() {
        debug!("publish {} = {}", reading.channel, text);
        sink.publish(reading.channel.name(), &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(std::vec::Vec<(std::string::String, std::string::String)>);

    impl TelemetrySink for Collect {
        fn publish(&mut self, channel: &str, value: &str) {
            self.0.push((channel.into(), value.into()));
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = SystemConfig {
            exit_cleaning_votes: 4,
            ..SystemConfig::default()
        };
        assert!(EngineService::new(cfg).is_err());
    }

    #[test]
    fn start_publishes_sleeping() {
        let mut svc = EngineService::new(SystemConfig::default()).unwrap();
        let mut sink = Collect::default();
        svc.start(&mut sink);
        assert_eq!(sink.0, [(
            std::string::String::from("client/status"),
            std::string::String::from("sleeping")
        )]);
    }

    #[test]
    fn dwell_gates_polls() {
        let mut svc = EngineService::new(SystemConfig::default()).unwrap();
        let mut sink = Collect::default();
        assert!(svc.poll_due(0));
        let _ = svc.ingest(&[], 1_000, &mut sink);
        assert!(!svc.poll_due(2_999));
        assert!(svc.poll_due(3_000));
    }

    #[test]
    fn status_report_serializes_camel_case() {
        let svc = EngineService::new(SystemConfig::default()).unwrap();
        let json = svc.status_report().to_json().unwrap();
        assert!(json.contains("\"mode\":\"sleeping\""));
        assert!(json.contains("\"odometerMm\":0"));
        assert!(json.contains("\"battery\":null"));
    }
}
