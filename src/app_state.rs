//! Shared application state injected into all Axum handlers.

use crate::config::{BrokerConfig, ClientSettings};
use crate::hub::HubHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Entry point into the broadcast hub.
    pub hub: HubHandle,
    /// Settings applied to every new subscriber.
    pub client_settings: ClientSettings,
    /// Largest inbound WebSocket message accepted from subscribers.
    pub max_message_size: usize,
}

impl AppState {
    /// Builds the state from a running hub and the loaded configuration.
    #[must_use]
    pub fn new(hub: HubHandle, config: &BrokerConfig) -> Self {
        Self {
            hub,
            client_settings: config.client_settings(),
            max_message_size: config.max_message_size,
        }
    }
}
