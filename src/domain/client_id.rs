//! Subscriber identity.
//!
//! [`ClientId`] wraps a UUID v4 generated when a connection subscribes. It
//! is used only for set membership inside the room directory.

use std::fmt;

use serde::Serialize;

/// Opaque identity of one subscribed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    /// Creates a new random `ClientId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
