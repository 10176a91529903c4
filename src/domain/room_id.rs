//! Type-safe room identifier.
//!
//! [`RoomId`] is a validated newtype around an opaque string key. The
//! broker never interprets the key beyond checking that it is usable as a
//! single URL path segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

/// Maximum length of a room key in bytes.
pub const MAX_ROOM_ID_LEN: usize = 128;

/// Room receiving every newly created offer.
pub const OFFERS_FEED: &str = "offers";

/// Identifier of a broadcast room.
///
/// Publishers use [`RoomId::offers_feed`] for the general offer feed and the
/// originating record's identifier (offer or request ID) for narrowcast
/// comment rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Validates `key` and wraps it as a `RoomId`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InvalidRoom`] if the key is empty, longer than
    /// [`MAX_ROOM_ID_LEN`] bytes, or contains `/` or control characters.
    pub fn new(key: impl Into<String>) -> Result<Self, BrokerError> {
        let key = key.into();
        if key.is_empty() {
            return Err(BrokerError::InvalidRoom("room id must not be empty".to_string()));
        }
        if key.len() > MAX_ROOM_ID_LEN {
            return Err(BrokerError::InvalidRoom(format!(
                "room id exceeds {MAX_ROOM_ID_LEN} bytes"
            )));
        }
        if key.chars().any(|c| c == '/' || c.is_control()) {
            return Err(BrokerError::InvalidRoom(format!(
                "room id contains a forbidden character: {key:?}"
            )));
        }
        Ok(Self(key))
    }

    /// The general feed room for newly created offers.
    #[must_use]
    pub fn offers_feed() -> Self {
        Self(OFFERS_FEED.to_string())
    }

    /// Returns the room key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomId {
    type Error = BrokerError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

impl TryFrom<&str> for RoomId {
    type Error = BrokerError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}
