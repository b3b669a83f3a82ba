//! Roombridge Firmware: Main Entry Point
//!
//! Bridges an Open Interface vacuum robot to an MQTT broker.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RobotLink        MqttBridge        LogTelemetrySink  Clock    │
//! │  (DevicePort)     (TelemetrySink +  (TelemetrySink)            │
//! │                    command source)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            EngineService (pure logic)                  │    │
//! │  │  Decode · FSM · Odometry · Delta filter · Dispatch     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use roombridge::adapters::log_sink::{LogTelemetrySink, Tee};
use roombridge::adapters::mqtt::MqttBridge;
use roombridge::adapters::serial::RobotLink;
use roombridge::adapters::time::MonotonicClock;
use roombridge::app::commands::CommandId;
use roombridge::app::dispatch::DispatchOutcome;
use roombridge::app::service::EngineService;
use roombridge::config::SystemConfig;
use roombridge::events;

// ── Build-time settings ───────────────────────────────────────

const WIFI_SSID: &str = match option_env!("ROOMBRIDGE_WIFI_SSID") {
    Some(v) => v,
    None => "roombridge",
};
const WIFI_PASS: &str = match option_env!("ROOMBRIDGE_WIFI_PASS") {
    Some(v) => v,
    None => "",
};
const MQTT_URL: &str = match option_env!("ROOMBRIDGE_MQTT_URL") {
    Some(v) => v,
    None => "mqtt://192.168.1.10:1883",
};
const MQTT_PREFIX: &str = match option_env!("ROOMBRIDGE_MQTT_PREFIX") {
    Some(v) => v,
    None => "roomba",
};

/// Main-loop sleep between iterations.
const LOOP_IDLE_MS: u32 = 50;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Roombridge v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Network ────────────────────────────────────────────
    let _wifi = connect_wifi(peripherals.modem, sysloop, nvs).context("WiFi bring-up")?;

    // ── 3. Adapters ───────────────────────────────────────────
    let config = SystemConfig::default();
    let mut link = RobotLink::new().map_err(|e| anyhow!("robot link: {e}"))?;
    let mut delay = FreeRtos;
    let clock = MonotonicClock::new();
    let mut log_sink = LogTelemetrySink::new();
    let mut mqtt = MqttBridge::new(MQTT_URL, "roombridge", MQTT_PREFIX)?;

    // ── 4. Engine ─────────────────────────────────────────────
    let mut engine = EngineService::new(config).map_err(|e| anyhow!("config: {e}"))?;
    engine.start(&mut Tee {
        first: &mut mqtt,
        second: &mut log_sink,
    });

    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    loop {
        let now_ms = clock.now_ms();

        // Broker (re)connected: resubscribe and resend retained state.
        if mqtt.take_connected() {
            if let Err(e) = mqtt.subscribe_commands() {
                warn!("mqtt: subscribe failed: {}", e);
            }
            engine.republish_all(&mut mqtt);
        }

        let mut sink = Tee {
            first: &mut mqtt,
            second: &mut log_sink,
        };

        if engine.poll_due(now_ms) {
            if let Err(e) = engine.poll(&mut link, now_ms, &mut sink) {
                // Already logged; the robot is taken to be asleep.
                log::debug!("poll skipped: {}", e);
            }
        }

        let mut restart = false;
        events::drain_commands(|cmd| {
            info!("command: {} {:?}", cmd.id, cmd.payload());
            match engine.handle_command(cmd.id, cmd.payload(), &mut link, &mut delay, &mut sink) {
                Ok(DispatchOutcome::ControlPlane(CommandId::Restart)) => restart = true,
                Ok(DispatchOutcome::ControlPlane(id)) if id != CommandId::Status => {
                    info!("command: {} is handled outside the bridge", id);
                }
                Ok(_) => {}
                Err(e) => warn!("command {} rejected: {}", cmd.id, e),
            }
        });

        if restart {
            info!("Restart requested. Rebooting.");
            // SAFETY: esp_restart never returns; nothing is left to flush.
            unsafe { esp_idf_svc::sys::esp_restart() };
        }

        FreeRtos::delay_ms(LOOP_IDLE_MS);
    }
}

// ── WiFi ──────────────────────────────────────────────────────

fn connect_wifi(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> Result<BlockingWifi<EspWifi<'static>>> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|_| anyhow!("SSID longer than 32 bytes"))?,
        password: WIFI_PASS
            .try_into()
            .map_err(|_| anyhow!("password longer than 64 bytes"))?,
        auth_method: if WIFI_PASS.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("WiFi: connecting to '{}'", WIFI_SSID);
    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("WiFi: connected");
    Ok(wifi)
}
