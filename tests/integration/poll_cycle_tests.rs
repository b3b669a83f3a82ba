//! Integration tests for the poll → decode → FSM → telemetry pipeline.
//!
//! A scripted robot answers each poll; the collecting sink captures what
//! the engine decided to publish.

use roombridge::app::service::EngineService;
use roombridge::config::SystemConfig;
use roombridge::error::Error;
use roombridge::fsm::RunMode;

use crate::mock_hw::{CollectingSink, Frame, MockRobot};

fn started() -> (EngineService, MockRobot, CollectingSink) {
    let mut engine = EngineService::new(SystemConfig::default()).unwrap();
    let mut sink = CollectingSink::new();
    engine.start(&mut sink);
    (engine, MockRobot::new(), sink)
}

#[test]
fn boots_sleeping_and_wakes_on_first_frame() {
    let (mut engine, mut robot, mut sink) = started();
    assert_eq!(sink.take(), [(String::from("client/status"), String::from("sleeping"))]);

    robot.reply(&Frame::docked().bytes());
    let transition = engine.poll(&mut robot, 0, &mut sink).unwrap();

    assert_eq!(transition, Some((RunMode::Sleeping, RunMode::Idling)));
    assert_eq!(sink.last("client/status"), Some("idling"));
    assert_eq!(sink.last("sensor/batteryVoltage"), Some("16400"));
    assert_eq!(sink.last("sensor/batteryCurrent"), Some("150"));
    assert_eq!(sink.last("sensor/batteryTemperature"), Some("24"));
    assert_eq!(sink.last("sensor/batteryCharge"), Some("2600"));
    assert_eq!(sink.last("sensor/batteryCapacity"), Some("2700"));
    assert_eq!(sink.last("sensor/batteryPercent"), Some("96"));
    assert_eq!(sink.last("sensor/chargingState"), Some("full"));
}

#[test]
fn unchanged_telemetry_is_published_once() {
    let (mut engine, mut robot, mut sink) = started();
    robot.reply(&Frame::docked().bytes()).reply(&Frame::docked().bytes());

    engine.poll(&mut robot, 0, &mut sink).unwrap();
    sink.take();
    engine.poll(&mut robot, 2_000, &mut sink).unwrap();
    assert!(sink.published.is_empty(), "got {:?}", sink.published);
}

#[test]
fn full_cleaning_cycle_reports_duration_and_distance() {
    let (mut engine, mut robot, mut sink) = started();
    robot
        .reply(&Frame::docked().bytes())
        .reply(&Frame::cleaning().encoders(0, 0).bytes())
        .reply(&Frame::cleaning().encoders(509, 509).bytes())
        .reply(&Frame::cleaning().encoders(1018, 1018).bytes())
        .reply(&Frame::docked().encoders(1018, 1018).bytes());

    engine.poll(&mut robot, 0, &mut sink).unwrap();
    engine.poll(&mut robot, 2_000, &mut sink).unwrap();
    assert_eq!(engine.run_mode(), RunMode::Cleaning);
    assert_eq!(engine.odometer_mm(), 0);

    engine.poll(&mut robot, 4_000, &mut sink).unwrap();
    engine.poll(&mut robot, 6_000, &mut sink).unwrap();
    assert_eq!(engine.odometer_mm(), 452);
    assert!(sink.values("sensor/cleaningDuration").is_empty());

    engine.poll(&mut robot, 62_000, &mut sink).unwrap();
    assert_eq!(engine.run_mode(), RunMode::Idling);
    assert_eq!(sink.values("sensor/cleaningDuration"), ["60"]);
    assert_eq!(sink.values("sensor/cleaningDistance"), ["452"]);
    assert_eq!(
        sink.values("client/status"),
        ["sleeping", "idling", "cleaning", "idling"]
    );
}

#[test]
fn encoder_rollover_mid_cycle_counts_forward() {
    let (mut engine, mut robot, mut sink) = started();
    robot
        .reply(&Frame::cleaning().encoders(65_500, 65_500).bytes())
        .reply(&Frame::cleaning().encoders(20, 20).bytes());

    engine.poll(&mut robot, 0, &mut sink).unwrap();
    assert_eq!(engine.run_mode(), RunMode::Cleaning);
    engine.poll(&mut robot, 2_000, &mut sink).unwrap();
    // 55 ticks forward, not 65 480 backwards.
    assert_eq!(engine.odometer_mm(), 24);
}

#[test]
fn short_reply_is_rejected_and_robot_taken_asleep() {
    let (mut engine, mut robot, mut sink) = started();
    robot.reply(&Frame::docked().bytes()).reply(&[0u8; 10]);
    engine.poll(&mut robot, 0, &mut sink).unwrap();
    sink.take();

    let err = engine.poll(&mut robot, 2_000, &mut sink).unwrap_err();
    assert_eq!(
        err,
        Error::FrameLengthMismatch {
            expected: 26,
            actual: 10
        }
    );
    assert_eq!(engine.run_mode(), RunMode::Sleeping);
    assert_eq!(sink.take(), [(String::from("client/status"), String::from("sleeping"))]);
}

#[test]
fn over_long_reply_is_rejected() {
    let (mut engine, mut robot, mut sink) = started();
    robot.reply(&[0u8; 30]);
    let err = engine.poll(&mut robot, 0, &mut sink).unwrap_err();
    assert_eq!(
        err,
        Error::FrameLengthMismatch {
            expected: 26,
            actual: 30
        }
    );
    assert!(engine.status_report().to_json().unwrap().contains("\"malformedPolls\":1"));
}

#[test]
fn silent_robot_while_cleaning_aborts_without_report() {
    let (mut engine, mut robot, mut sink) = started();
    robot.reply(&Frame::cleaning().bytes()).silent();

    engine.poll(&mut robot, 0, &mut sink).unwrap();
    assert_eq!(engine.run_mode(), RunMode::Cleaning);

    assert!(engine.poll(&mut robot, 2_000, &mut sink).is_err());
    assert_eq!(engine.run_mode(), RunMode::Sleeping);
    assert!(sink.values("sensor/cleaningDuration").is_empty());
}

#[test]
fn republish_all_resends_every_tracked_channel() {
    let (mut engine, mut robot, mut sink) = started();
    robot.reply(&Frame::docked().bytes());
    engine.poll(&mut robot, 0, &mut sink).unwrap();
    sink.take();

    engine.republish_all(&mut sink);
    assert_eq!(sink.published.len(), 8);
    assert_eq!(sink.last("client/status"), Some("idling"));
}

#[test]
fn poll_dwell_follows_config() {
    let cfg = SystemConfig {
        poll_interval_ms: 5_000,
        ..SystemConfig::default()
    };
    let mut engine = EngineService::new(cfg).unwrap();
    let mut sink = CollectingSink::new();
    let mut robot = MockRobot::new();
    engine.start(&mut sink);

    assert!(engine.poll_due(0));
    let _ = engine.poll(&mut robot, 100, &mut sink);
    assert!(!engine.poll_due(5_099));
    assert!(engine.poll_due(5_100));
}
