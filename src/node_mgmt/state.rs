use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Configuration lifecycle of the gateway node
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum GatewayState {
    Unconfigured,
    Configured,
    /// Transient; held while a configuration command is being applied
    Reconfiguring,
}

impl GatewayState {
    pub fn settled(configured: bool) -> Self {
        if configured {
            GatewayState::Configured
        } else {
            GatewayState::Unconfigured
        }
    }
}

impl fmt::Display for GatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Holds the current state and broadcasts every transition to subscribers
pub struct StateTracker {
    state: Mutex<GatewayState>,
    listeners: Mutex<Vec<flume::Sender<GatewayState>>>,
}

impl StateTracker {
    pub fn new(initial: GatewayState) -> Self {
        StateTracker {
            state: Mutex::new(initial),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> GatewayState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> flume::Receiver<GatewayState> {
        let (tx, rx) = flume::unbounded();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn begin_reconfigure(&self) {
        self.transition(GatewayState::Reconfiguring);
    }

    pub fn settle(&self, configured: bool) {
        self.transition(GatewayState::settled(configured));
    }

    fn transition(&self, next: GatewayState) {
        let prev = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, next)
        };
        log::debug!("Gateway state {prev} -> {next}");

        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|tx| tx.send(next).is_ok());
    }
}
