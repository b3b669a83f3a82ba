//! Integration tests for inbound commands: dispatch, byte playback with
//! inter-byte spacing, and the mode changes a command forces.

use roombridge::app::commands::CommandId;
use roombridge::app::dispatch::DispatchOutcome;
use roombridge::app::service::{EngineService, STATUS_REPORT_CHANNEL};
use roombridge::config::SystemConfig;
use roombridge::error::{Error, PayloadError};
use roombridge::events;
use roombridge::fsm::RunMode;

use crate::mock_hw::{CollectingSink, DeviceCall, Frame, MockDelay, MockRobot};

struct Rig {
    engine: EngineService,
    robot: MockRobot,
    delay: MockDelay,
    sink: CollectingSink,
}

impl Rig {
    fn new() -> Self {
        let mut engine = EngineService::new(SystemConfig::default()).unwrap();
        let mut sink = CollectingSink::new();
        engine.start(&mut sink);
        sink.take();
        Self {
            engine,
            robot: MockRobot::new(),
            delay: MockDelay::new(),
            sink,
        }
    }

    /// Poll once with `frame` so the engine leaves SLEEPING.
    fn observe(&mut self, frame: Frame, now_ms: u64) {
        self.robot.reply(&frame.bytes());
        self.engine.poll(&mut self.robot, now_ms, &mut self.sink).unwrap();
        self.robot.clear();
        self.sink.take();
    }

    fn send(&mut self, id: CommandId, payload: Option<&str>) -> roombridge::error::Result<DispatchOutcome> {
        self.engine.handle_command(
            id,
            payload,
            &mut self.robot,
            &mut self.delay,
            &mut self.sink,
        )
    }
}

#[test]
fn clean_while_sleeping_wakes_then_starts() {
    let mut rig = Rig::new();
    rig.send(CommandId::Clean, None).unwrap();

    assert_eq!(
        rig.robot.calls,
        [
            DeviceCall::Wake(100),
            DeviceCall::Write(128),
            DeviceCall::Write(135)
        ]
    );
    // One gap between each pair of steps, never after the last.
    assert_eq!(rig.delay.delays_ms(), [50, 50]);
    // The robot's own telemetry decides when cleaning starts.
    assert_eq!(rig.engine.run_mode(), RunMode::Sleeping);
}

#[test]
fn dock_while_idling_skips_wake() {
    let mut rig = Rig::new();
    rig.observe(Frame::docked(), 0);

    rig.send(CommandId::Dock, None).unwrap();
    assert_eq!(rig.robot.wake_count(), 0);
    assert_eq!(rig.robot.written(), [128, 143]);
    assert_eq!(rig.delay.delays_ms(), [50]);
}

#[test]
fn stop_while_idling_writes_nothing() {
    let mut rig = Rig::new();
    rig.observe(Frame::docked(), 0);

    assert_eq!(rig.send(CommandId::Stop, None), Ok(DispatchOutcome::NothingToStop));
    assert!(rig.robot.calls.is_empty());
    assert!(rig.sink.published.is_empty());
}

#[test]
fn stop_while_cleaning_toggles_clean() {
    let mut rig = Rig::new();
    rig.observe(Frame::cleaning(), 0);
    assert_eq!(rig.engine.run_mode(), RunMode::Cleaning);

    rig.send(CommandId::Stop, None).unwrap();
    assert_eq!(rig.robot.written(), [128, 135]);
    assert_eq!(rig.engine.run_mode(), RunMode::Cleaning);
}

#[test]
fn set_time_writes_day_hour_minute() {
    let mut rig = Rig::new();
    rig.send(CommandId::SetTime, Some("monday,09:05")).unwrap();
    assert_eq!(rig.robot.written(), [128, 168, 1, 9, 5]);
    assert_eq!(rig.delay.delays_ms().len(), 4);
}

#[test]
fn invalid_set_time_writes_nothing() {
    let mut rig = Rig::new();

    assert_eq!(
        rig.send(CommandId::SetTime, Some("funday,10:15")),
        Err(Error::CommandPayloadInvalid(PayloadError::UnknownWeekday))
    );
    assert_eq!(
        rig.send(CommandId::SetTime, Some("monday,25:00")),
        Err(Error::CommandPayloadInvalid(PayloadError::HourOutOfRange(25)))
    );
    assert!(rig.robot.calls.is_empty());
    assert!(rig.delay.delays_ns.is_empty());
}

#[test]
fn reset_schedule_clears_every_day() {
    let mut rig = Rig::new();
    rig.send(CommandId::ResetSchedule, None).unwrap();

    let written = rig.robot.written();
    assert_eq!(written.len(), 17);
    assert_eq!(&written[..2], [128, 167]);
    assert!(written[2..].iter().all(|&b| b == 0));
}

#[test]
fn reboot_forces_sleeping_and_publishes_it() {
    let mut rig = Rig::new();
    rig.observe(Frame::cleaning(), 0);

    rig.send(CommandId::Reboot, None).unwrap();
    assert_eq!(rig.robot.written(), [128, 7]);
    assert_eq!(rig.engine.run_mode(), RunMode::Sleeping);
    assert_eq!(rig.sink.last("client/status"), Some("sleeping"));
}

#[test]
fn wake_moves_sleeping_to_idling_once() {
    let mut rig = Rig::new();

    rig.send(CommandId::Wake, None).unwrap();
    assert_eq!(rig.robot.calls, [DeviceCall::Wake(100)]);
    assert_eq!(rig.engine.run_mode(), RunMode::Idling);
    assert_eq!(rig.sink.last("client/status"), Some("idling"));

    rig.robot.clear();
    assert_eq!(rig.send(CommandId::Wake, None), Ok(DispatchOutcome::AlreadyAwake));
    assert!(rig.robot.calls.is_empty());
}

#[test]
fn status_publishes_json_report() {
    let mut rig = Rig::new();
    rig.observe(Frame::docked(), 0);

    assert_eq!(
        rig.send(CommandId::Status, None),
        Ok(DispatchOutcome::ControlPlane(CommandId::Status))
    );
    let json = rig.sink.last(STATUS_REPORT_CHANNEL).unwrap();
    assert!(json.contains("\"mode\":\"idling\""), "{json}");
    assert!(json.contains("\"percent\":96"), "{json}");
    assert!(json.contains("\"chargingState\":\"full\""), "{json}");
    assert!(rig.robot.calls.is_empty());
}

#[test]
fn restart_is_left_to_the_caller() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send(CommandId::Restart, None),
        Ok(DispatchOutcome::ControlPlane(CommandId::Restart))
    );
    assert!(rig.robot.calls.is_empty());
    assert!(rig.sink.published.is_empty());
}

#[test]
fn queued_commands_reach_the_engine_in_order() {
    let mut rig = Rig::new();
    assert!(events::push_command(CommandId::Wake, None));
    assert!(events::push_command(CommandId::SetTime, Some("Tuesday,7:30")));

    let mut outcomes = Vec::new();
    events::drain_commands(|cmd| outcomes.push(rig.send(cmd.id, cmd.payload())));

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(
        rig.robot.calls,
        [
            DeviceCall::Wake(100),
            DeviceCall::Write(128),
            DeviceCall::Write(168),
            DeviceCall::Write(2),
            DeviceCall::Write(7),
            DeviceCall::Write(30)
        ]
    );
}
