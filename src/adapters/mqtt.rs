//! Message-bus adapter.
//!
//! Telemetry goes out as `<prefix>/<channel>` (for example
//! `roomba/sensor/batteryVoltage`); commands come in on
//! `<prefix>/command/<name>` with an optional UTF-8 payload.
//!
//! Inbound messages arrive on the MQTT client task.  They are only parsed
//! here and pushed onto the [`events`](crate::events) queue; the engine is
//! never touched from the callback.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: only the topic helpers are compiled.

use heapless::String;

use crate::app::commands::CommandId;

/// Longest topic the adapter builds.
pub const TOPIC_CAP: usize = 96;

/// Segment between the prefix and the command name.
const COMMAND_SEGMENT: &str = "command";

/// Map an inbound topic to a command.
///
/// Accepts exactly `<prefix>/command/<name>`; anything else is ignored.
pub fn command_from_topic(prefix: &str, topic: &str) -> Option<CommandId> {
    let rest = topic.strip_prefix(prefix)?.strip_prefix('/')?;
    let name = rest.strip_prefix(COMMAND_SEGMENT)?.strip_prefix('/')?;
    CommandId::from_name(name)
}

/// `<prefix>/<channel>`, or `None` if it would exceed [`TOPIC_CAP`].
pub fn telemetry_topic(prefix: &str, channel: &str) -> Option<String<TOPIC_CAP>> {
    let mut topic = String::new();
    topic.push_str(prefix).ok()?;
    topic.push('/').ok()?;
    topic.push_str(channel).ok()?;
    Some(topic)
}

/// `<prefix>/command/#`, the subscription filter for every command.
pub fn command_filter(prefix: &str) -> Option<String<TOPIC_CAP>> {
    let mut topic = telemetry_topic(prefix, COMMAND_SEGMENT)?;
    topic.push_str("/#").ok()?;
    Some(topic)
}

/// Decode a message payload.  Empty or non-UTF-8 payloads count as absent.
pub fn payload_text(data: &[u8]) -> Option<&str> {
    core::str::from_utf8(data)
        .ok()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use client::MqttBridge;

#[cfg(target_os = "espidf")]
mod client {
    use core::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
    use esp_idf_svc::sys::EspError;
    use log::{info, warn};

    use super::{command_filter, command_from_topic, payload_text, telemetry_topic};
    use crate::app::ports::TelemetrySink;
    use crate::events::push_command;

    /// Set by the client task on (re)connect; cleared by the main loop.
    static JUST_CONNECTED: AtomicBool = AtomicBool::new(false);

    pub struct MqttBridge {
        client: EspMqttClient<'static>,
        prefix: &'static str,
    }

    impl MqttBridge {
        /// Connect to `url` and route `<prefix>/command/*` into the command queue.
        pub fn new(url: &str, client_id: &str, prefix: &'static str) -> Result<Self, EspError> {
            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };
            let client = EspMqttClient::new_cb(url, &conf, move |event| match event.payload() {
                EventPayload::Connected(_) => {
                    info!("mqtt: connected");
                    JUST_CONNECTED.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => warn!("mqtt: disconnected"),
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } => match command_from_topic(prefix, topic) {
                    Some(id) => {
                        push_command(id, payload_text(data));
                    }
                    None => warn!("mqtt: ignoring message on '{}'", topic),
                },
                _ => {}
            })?;
            Ok(Self { client, prefix })
        }

        /// Subscribe to the command filter.  Call after every reconnect.
        pub fn subscribe_commands(&mut self) -> Result<(), EspError> {
            if let Some(filter) = command_filter(self.prefix) {
                self.client.subscribe(&filter, QoS::AtLeastOnce)?;
                info!("mqtt: subscribed to {}", filter);
            }
            Ok(())
        }

        /// True once after each (re)connect.
        pub fn take_connected(&self) -> bool {
            JUST_CONNECTED.swap(false, Ordering::AcqRel)
        }
    }

    impl TelemetrySink for MqttBridge {
        fn publish(&mut self, channel: &str, value: &str) {
            let Some(topic) = telemetry_topic(self.prefix, channel) else {
                warn!("mqtt: topic for {} too long", channel);
                return;
            };
            if let Err(e) = self.client.publish(&topic, QoS::AtMostOnce, true, value.as_bytes()) {
                warn!("mqtt: publish {} failed: {}", topic, e);
            }
        }
    }
}
