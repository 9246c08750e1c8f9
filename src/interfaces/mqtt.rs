use std::env;
use std::str::{from_utf8, Utf8Error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use once_cell::sync::Lazy;
use rumqttc::{Client, Connection, Event, MqttOptions, Outgoing, Packet, QoS};
use thiserror::Error;

use crate::constants::{defaults, envvars};
use crate::helpers::rand_hex;

static MQTT_BRIDGE_HOST: Lazy<String> = Lazy::new(|| {
    if let Ok(host) = env::var(envvars::MQTT_BRIDGE_HOST) {
        return host;
    }
    defaults::MQTT_BRIDGE_HOST.to_string()
});

static MQTT_BRIDGE_PORT: Lazy<u16> = Lazy::new(|| {
    env::var(envvars::MQTT_BRIDGE_PORT)
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(defaults::MQTT_BRIDGE_PORT)
});

#[derive(Debug, Clone, PartialEq)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: String,
}

impl MqttMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        MqttMessage {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MqttError {
    #[error(transparent)]
    Utf8(#[from] Utf8Error),
    #[error(transparent)]
    MqttClient(#[from] rumqttc::ClientError),
    #[error(transparent)]
    MqttConnection(#[from] rumqttc::ConnectionError),
}

pub fn get_rand_client_id(prefix: Option<&str>) -> String {
    const RAND_ID_BYTES: usize = 3;
    let randhex = rand_hex(RAND_ID_BYTES);

    if let Some(pref) = prefix {
        format!("{pref}-{randhex}")
    } else {
        randhex
    }
}

pub fn client_conn(client_id: String, clean_session: Option<bool>) -> (Client, Connection) {
    let host = MQTT_BRIDGE_HOST.clone();
    let port = *MQTT_BRIDGE_PORT;
    log::info!("Establishing MQTT connection to {host}:{port} as {client_id}");

    let mut mqttoptions = MqttOptions::new(client_id, host, port);
    mqttoptions.set_clean_session(clean_session.unwrap_or(true));

    Client::new(mqttoptions, 10)
}

/// Publish all messages over a short-lived connection, returning once every one is acked
pub fn publish_msgs(
    messages: &[MqttMessage],
    retain: bool,
    client_prefix: Option<&str>,
) -> Result<(), MqttError> {
    if messages.is_empty() {
        return Ok(());
    }
    let (mut client, mut connection) = client_conn(get_rand_client_id(client_prefix), None);

    let mut expected_msg_acks = messages.len();

    for msg in messages.iter() {
        log::debug!("Publishing to {}: {}", msg.topic, msg.payload);

        client.publish(
            msg.topic.clone(),
            QoS::AtLeastOnce,
            retain,
            msg.payload.as_bytes(),
        )?;
    }

    for notification in connection.iter() {
        log::trace!("Notification = {:?}", notification);
        match notification {
            Ok(Event::Incoming(Packet::PubAck(_))) => expected_msg_acks -= 1,
            Err(e) => return Err(e.into()),
            _ => (),
        }
        if expected_msg_acks == 0 {
            break;
        }
    }
    client.disconnect()?;
    Ok(())
}

/// A background subscription; dropped messages are not redelivered
pub struct Subscription {
    client: Client,
    closing: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn close(mut self) {
        self.closing.store(true, Ordering::SeqCst);
        if let Err(e) = self.client.disconnect() {
            log::debug!("MQTT disconnect on close: {e}");
        }
        if self.handle.join().is_err() {
            log::error!("MQTT subscription thread panicked");
        }
    }
}

/// Subscribe to `topics` on a dedicated thread, calling `func` for every message.
///
/// Topics are (re-)subscribed on every ConnAck, so the subscription survives
/// broker restarts. Connection errors are logged and retried until `close`.
pub fn subscribe<F>(
    topics: &[String],
    client_prefix: Option<&str>,
    func: F,
) -> Result<Subscription, MqttError>
where
    F: Fn(MqttMessage) + Send + 'static,
{
    let (client, mut connection) = client_conn(get_rand_client_id(client_prefix), None);
    let closing = Arc::new(AtomicBool::new(false));

    let thread_closing = closing.clone();
    let mut sub_client = client.clone();
    let topics = topics.to_vec();

    let handle = thread::Builder::new()
        .name("mqtt-sub".into())
        .spawn(move || {
            for notification in connection.iter() {
                if thread_closing.load(Ordering::SeqCst) {
                    break;
                }
                log::trace!("Notification = {:?}", notification);
                match notification {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        for topic in topics.iter() {
                            log::info!("Subscribing to {}", topic);
                            if let Err(e) = sub_client.try_subscribe(topic.clone(), QoS::ExactlyOnce)
                            {
                                log::error!("Could not subscribe to {topic}: {e}");
                            }
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(p))) => match from_utf8(&p.payload) {
                        Ok(payload) => func(MqttMessage::new(p.topic.clone(), payload)),
                        Err(e) => log::warn!("Ignoring non-UTF-8 payload on {}: {}", p.topic, e),
                    },
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(_) => (),
                    Err(e) => {
                        log::warn!("MQTT connection error: {e}");
                        thread::sleep(defaults::MQTT_RECONNECT_DELAY);
                    }
                }
            }
            log::debug!("MQTT subscription thread finished");
        })
        .map_err(|e| MqttError::MqttConnection(rumqttc::ConnectionError::Io(e)))?;

    Ok(Subscription {
        client,
        closing,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_has_prefix_and_random_suffix() {
        let id = get_rand_client_id(Some("onewire"));
        let (prefix, suffix) = id.split_once('-').unwrap();
        assert_eq!(prefix, "onewire");
        assert_eq!(suffix.len(), 6);
        assert_eq!(get_rand_client_id(None).len(), 6);
    }

    #[test]
    fn publishing_nothing_needs_no_broker() {
        assert!(publish_msgs(&[], true, None).is_ok());
    }
}
