//! Runs the poll timer, receives configuration commands and publishes node discovery.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::constants::defaults;
use crate::helpers::backoff_retry;
use crate::interfaces::mqtt::{self, MqttError, MqttMessage, Subscription};
use crate::node_mgmt::{
    configure_topic, node_address_from_configure_topic, ConfigHandler, DiscoverySnapshot,
    NodeRegistry, Poller, RegistryError,
};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("MQTT error: {0}")]
    Mqtt(#[from] MqttError),
    #[error("could not serialize discovery snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no node registered at {0}")]
    UnknownNode(String),
}

#[derive(Error, Debug)]
pub enum ConfigMessageError {
    #[error("'{0}' is not a configure topic")]
    NotConfigureTopic(String),
    #[error("no configuration handler registered")]
    NoHandler,
    #[error("configure payload must be a JSON object: {0}")]
    BadPayload(#[from] serde_json::Error),
}

/// Destination of discovery publications
pub trait DiscoverySink: Send + Sync {
    fn publish(&self, address: &str, payload: &str) -> Result<(), PublishError>;
}

/// Publishes retained discovery messages to the local MQTT broker
#[derive(Debug, Default)]
pub struct MqttDiscoverySink;

impl DiscoverySink for MqttDiscoverySink {
    fn publish(&self, address: &str, payload: &str) -> Result<(), PublishError> {
        let messages = [MqttMessage::new(address, payload)];
        backoff_retry(
            || {
                mqtt::publish_msgs(&messages, true, Some("onewire-disc"))
                    .map_err(backoff::Error::transient)
            },
            Some(defaults::PUBLISH_MAX_ELAPSED),
        )
        .map_err(|e| match e {
            backoff::Error::Permanent(err) | backoff::Error::Transient { err, .. } => err.into(),
        })
    }
}

/// Result of one configure message
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConfigOutcome {
    pub applied: usize,
    pub rejected: usize,
}

#[derive(Clone)]
struct Discovery {
    registry: Arc<dyn NodeRegistry>,
    sink: Arc<dyn DiscoverySink>,
}

impl Discovery {
    fn publish_node(&self, address: &str) -> Result<(), PublishError> {
        let node = self
            .registry
            .get_node_by_address(address)?
            .ok_or_else(|| PublishError::UnknownNode(address.to_string()))?;
        let payload = DiscoverySnapshot::from(&node).to_json()?;
        self.sink.publish(&node.discovery_address, &payload)
    }

    fn publish_all(&self) -> Result<usize, PublishError> {
        let nodes = self.registry.nodes()?;
        for node in nodes.iter() {
            let payload = DiscoverySnapshot::from(node).to_json()?;
            self.sink.publish(&node.discovery_address, &payload)?;
        }
        log::info!("Published discovery for {} node(s)", nodes.len());
        Ok(nodes.len())
    }
}

#[derive(Clone)]
struct CommandDispatcher {
    discovery: Discovery,
    handler: Arc<dyn ConfigHandler>,
}

fn value_as_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl CommandDispatcher {
    fn dispatch(&self, topic: &str, payload: &str) -> Result<ConfigOutcome, ConfigMessageError> {
        let address = node_address_from_configure_topic(topic)
            .ok_or_else(|| ConfigMessageError::NotConfigureTopic(topic.to_string()))?;
        let pairs: Map<String, Value> = serde_json::from_str(payload)?;

        let mut outcome = ConfigOutcome::default();
        for (key, value) in pairs {
            let Some(value) = value_as_string(value) else {
                log::warn!("Ignoring non-scalar value for '{key}' on {address}");
                outcome.rejected += 1;
                continue;
            };
            match self.handler.handle_config_command(&address, &key, &value) {
                Ok(()) => outcome.applied += 1,
                Err(e) => {
                    log::debug!("Config command rejected: {e}");
                    outcome.rejected += 1;
                }
            }
        }

        if outcome.applied > 0 {
            if let Err(e) = self.discovery.publish_node(&address) {
                log::error!("Could not republish discovery for {address}: {e}");
            }
        }
        Ok(outcome)
    }
}

struct Running {
    stop_tx: watch::Sender<bool>,
    poll_task: Option<JoinHandle<()>>,
    subscription: Option<Subscription>,
}

/// Drives the callbacks of one publisher
pub struct Publisher {
    discovery: Discovery,
    poll_interval: Duration,
    poller: Option<Arc<dyn Poller>>,
    config_handler: Option<Arc<dyn ConfigHandler>>,
    listen_for_commands: bool,
    running: Option<Running>,
}

impl Publisher {
    pub fn new(registry: Arc<dyn NodeRegistry>, sink: Arc<dyn DiscoverySink>) -> Self {
        Publisher {
            discovery: Discovery { registry, sink },
            poll_interval: Duration::from_secs(defaults::POLL_INTERVAL_SECS),
            poller: None,
            config_handler: None,
            listen_for_commands: true,
            running: None,
        }
    }

    /// Whether `start` subscribes to configure topics over MQTT
    pub fn listen_for_commands(mut self, listen: bool) -> Self {
        self.listen_for_commands = listen;
        self
    }

    pub fn set_poll_interval(&mut self, seconds: u64, poller: Arc<dyn Poller>) {
        self.poll_interval = Duration::from_secs(seconds.max(1));
        self.poller = Some(poller);
    }

    pub fn set_node_config_handler(&mut self, handler: Arc<dyn ConfigHandler>) {
        self.config_handler = Some(handler);
    }

    fn dispatcher(&self) -> Option<CommandDispatcher> {
        self.config_handler.clone().map(|handler| CommandDispatcher {
            discovery: self.discovery.clone(),
            handler,
        })
    }

    /// Apply a `{key: value}` configure message to the node addressed by `topic`.
    ///
    /// Rejected pairs are logged and counted; they do not stop the remaining pairs.
    pub fn handle_config_message(
        &self,
        topic: &str,
        payload: &str,
    ) -> Result<ConfigOutcome, ConfigMessageError> {
        self.dispatcher()
            .ok_or(ConfigMessageError::NoHandler)?
            .dispatch(topic, payload)
    }

    /// Publish the redacted snapshot of every node, returning the node count
    pub fn publish_discovery(&self) -> Result<usize, PublishError> {
        self.discovery.publish_all()
    }

    pub async fn start(&mut self) -> Result<(), PublishError> {
        if self.running.is_some() {
            log::warn!("Publisher already started");
            return Ok(());
        }

        // Not fatal; discovery is republished on the next accepted change
        let discovery = self.discovery.clone();
        match tokio::task::spawn_blocking(move || discovery.publish_all()).await {
            Ok(Ok(_)) => (),
            Ok(Err(e)) => log::error!("Initial discovery publication failed: {e}"),
            Err(e) => log::error!("Discovery task failed: {e}"),
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let poll_task = self
            .poller
            .clone()
            .map(|poller| tokio::spawn(poll_loop(poller, self.poll_interval, stop_rx)));

        let subscription = match self.dispatcher() {
            Some(dispatcher) if self.listen_for_commands => {
                let topics: Vec<String> = self
                    .discovery
                    .registry
                    .nodes()?
                    .iter()
                    .filter_map(|n| configure_topic(&n.discovery_address))
                    .collect();
                Some(mqtt::subscribe(&topics, Some("onewire-cfg"), move |msg| {
                    match dispatcher.dispatch(&msg.topic, &msg.payload) {
                        Ok(outcome) => log::debug!("Configure on {}: {:?}", msg.topic, outcome),
                        Err(e) => log::warn!("Ignoring message on {}: {}", msg.topic, e),
                    }
                })?)
            }
            _ => None,
        };

        self.running = Some(Running {
            stop_tx,
            poll_task,
            subscription,
        });
        log::info!("Publisher started");
        Ok(())
    }

    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.stop_tx.send(true);
        if let Some(task) = running.poll_task {
            if let Err(e) = task.await {
                log::error!("Poll task failed: {e}");
            }
        }
        if let Some(subscription) = running.subscription {
            if let Err(e) = tokio::task::spawn_blocking(move || subscription.close()).await {
                log::error!("Could not close subscription: {e}");
            }
        }
        log::info!("Publisher stopped");
    }
}

async fn poll_loop(poller: Arc<dyn Poller>, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = timer.tick() => {
                let poller = poller.clone();
                match tokio::task::spawn_blocking(move || poller.poll(Utc::now())).await {
                    Ok(Ok(())) => (),
                    Ok(Err(e)) => log::error!("Poll failed: {e:#}"),
                    Err(e) => log::error!("Poll task panicked: {e}"),
                }
            }
            _ = stop_rx.changed() => break,
        }
    }
    log::debug!("Poll loop finished");
}

/// Wait for SIGINT or SIGTERM
pub async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = sigterm.recv() => log::info!("Received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}
