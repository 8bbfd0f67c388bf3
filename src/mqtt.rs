//! MQTT report sink
//!
//! Publishes every frequency report as JSON so a measurement rig can log
//! the pattern's own timing next to its sensor readings. The network runs on
//! a background thread; the render loop only ever enqueues.

use std::thread;
use std::time::Duration;

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};

use crate::error::{Error, Result};
use crate::report::{FrequencyReport, ReportSink};

pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "flashbench/frequency";
const CLIENT_ID: &str = "flashbench";
const QUEUE_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Split "host" or "host:port"
pub fn parse_broker(spec: &str) -> Result<(String, u16)> {
    match spec.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port
                .parse::<u16>()
                .map_err(|_| Error::invalid_argument("--mqtt", spec))?;
            Ok((host.to_string(), port))
        },
        Some(_) => Err(Error::invalid_argument("--mqtt", spec)),
        None if spec.is_empty() => Err(Error::invalid_argument("--mqtt", spec)),
        None => Ok((spec.to_string(), DEFAULT_PORT)),
    }
}

pub struct MqttSink {
    client: Client,
    topic: String,
    _thread: thread::JoinHandle<()>,
}

impl MqttSink {
    /// Connect to the broker. Fails immediately if it cannot be reached.
    pub fn connect(host: &str, port: u16, topic: &str) -> Result<Self> {
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new(CLIENT_ID, host, port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, QUEUE_CAPACITY);

        // Fail fast if the broker is unreachable
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(Error::Mqtt(format!(
                    "failed to connect to {}:{}: {}",
                    host, port, e
                )));
            },
            None => {
                return Err(Error::Mqtt(format!(
                    "failed to connect to {}:{}: connection closed",
                    host, port
                )));
            },
        }

        let handle = thread::spawn(move || {
            for event in connection.iter() {
                match event {
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        log::warn!("mqtt: broker disconnected");
                    },
                    Ok(_) => {},
                    Err(e) => {
                        log::warn!("mqtt: {}", e);
                        thread::sleep(RECONNECT_DELAY);
                    },
                }
            }
        });

        log::info!("mqtt: connected to {}:{}, publishing to '{}'", host, port, topic);

        Ok(Self {
            client,
            topic: topic.to_string(),
            _thread: handle,
        })
    }
}

impl ReportSink for MqttSink {
    fn report(&mut self, report: &FrequencyReport) {
        let payload = match serde_json::to_vec(report) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("mqtt: cannot encode report for {}: {}", report.label, e);
                return;
            },
        };
        // Never block the render loop on the network
        if let Err(e) = self
            .client
            .try_publish(self.topic.as_str(), QoS::AtMostOnce, false, payload)
        {
            log::warn!("mqtt: dropped report for {}: {}", report.label, e);
        }
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        let _ = self.client.try_disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_broker_default_port() {
        assert_eq!(
            parse_broker("192.168.1.20").unwrap(),
            ("192.168.1.20".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn test_parse_broker_with_port() {
        assert_eq!(
            parse_broker("broker.local:8883").unwrap(),
            ("broker.local".to_string(), 8883)
        );
    }

    #[test]
    fn test_parse_broker_rejects_garbage() {
        for bad in ["", ":1883", "host:", "host:99999", "host:abc"] {
            assert!(
                matches!(parse_broker(bad), Err(Error::InvalidArgument { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
