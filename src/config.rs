//! Broker configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset or unparsable numeric values
//! fall back to their defaults.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::BrokerError;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level broker configuration.
///
/// Loaded once at startup via [`BrokerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Capacity of each subscriber's outbound queue.
    pub client_queue_capacity: usize,

    /// Capacity of each of the hub's intake channels.
    pub hub_intake_capacity: usize,

    /// Seconds between keepalive pings sent to each subscriber.
    pub ping_interval_secs: u64,

    /// Seconds a subscriber may stay silent before it is considered gone.
    pub pong_wait_secs: u64,

    /// Seconds allowed for a single frame write.
    pub write_wait_secs: u64,

    /// Largest inbound frame accepted from a subscriber, in bytes.
    pub max_message_size: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            client_queue_capacity: 256,
            hub_intake_capacity: 1024,
            ping_interval_secs: 54,
            pong_wait_secs: 60,
            write_wait_secs: 10,
            max_message_size: 512,
            log_format: LogFormat::Text,
        }
    }
}

impl BrokerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InvalidConfig`] if `LISTEN_ADDR` is set but
    /// cannot be parsed, or if the resulting settings fail
    /// [`BrokerConfig::validate`].
    pub fn from_env() -> Result<Self, BrokerError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| BrokerError::InvalidConfig(format!("LISTEN_ADDR {raw:?}: {e}")))?,
            Err(_) => defaults.listen_addr,
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let config = Self {
            listen_addr,
            client_queue_capacity: parse_env("CLIENT_QUEUE_CAPACITY", defaults.client_queue_capacity),
            hub_intake_capacity: parse_env("HUB_INTAKE_CAPACITY", defaults.hub_intake_capacity),
            ping_interval_secs: parse_env("WS_PING_INTERVAL_SECS", defaults.ping_interval_secs),
            pong_wait_secs: parse_env("WS_PONG_WAIT_SECS", defaults.pong_wait_secs),
            write_wait_secs: parse_env("WS_WRITE_WAIT_SECS", defaults.write_wait_secs),
            max_message_size: parse_env("WS_MAX_MESSAGE_SIZE", defaults.max_message_size),
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InvalidConfig`] if a capacity or timeout is
    /// zero, or if the ping interval is not shorter than the pong wait.
    pub fn validate(&self) -> Result<(), BrokerError> {
        if self.client_queue_capacity == 0 || self.hub_intake_capacity == 0 {
            return Err(BrokerError::InvalidConfig(
                "queue capacities must be greater than zero".to_string(),
            ));
        }
        if self.ping_interval_secs == 0 || self.write_wait_secs == 0 {
            return Err(BrokerError::InvalidConfig(
                "ping interval and write wait must be greater than zero".to_string(),
            ));
        }
        if self.ping_interval_secs >= self.pong_wait_secs {
            return Err(BrokerError::InvalidConfig(format!(
                "ping interval ({}s) must be shorter than pong wait ({}s)",
                self.ping_interval_secs, self.pong_wait_secs
            )));
        }
        Ok(())
    }

    /// Per-connection settings derived from this configuration.
    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            queue_capacity: self.client_queue_capacity,
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            pong_wait: Duration::from_secs(self.pong_wait_secs),
            write_wait: Duration::from_secs(self.write_wait_secs),
        }
    }
}

/// Settings applied to every subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// Capacity of the outbound queue.
    pub queue_capacity: usize,
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
    /// Silence tolerated on the inbound side before the client is dropped.
    pub pong_wait: Duration,
    /// Deadline for a single frame write.
    pub write_wait: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        BrokerConfig::default().client_settings()
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
