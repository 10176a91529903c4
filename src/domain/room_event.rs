//! Room-scoped broadcast event.
//!
//! A [`RoomEvent`] pairs a destination room with an opaque payload. Events
//! are transient: they are never persisted or retried, and delivery to each
//! subscriber is at-most-once.

use bytes::Bytes;
use serde::Serialize;

use super::RoomId;

/// An immutable `(room, payload)` pair submitted for fan-out.
///
/// The payload is delivered verbatim; cloning an event only bumps the
/// reference count of the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEvent {
    room: RoomId,
    payload: Bytes,
}

impl RoomEvent {
    /// Creates an event carrying `payload` for `room`.
    #[must_use]
    pub fn new(room: RoomId, payload: impl Into<Bytes>) -> Self {
        Self {
            room,
            payload: payload.into(),
        }
    }

    /// Serializes `record` as JSON and wraps it as an event for `room`.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if `record` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(room: RoomId, record: &T) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(record)?;
        Ok(Self::new(room, payload))
    }

    /// Destination room.
    #[must_use]
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Opaque payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Splits the event into its room and payload.
    #[must_use]
    pub fn into_parts(self) -> (RoomId, Bytes) {
        (self.room, self.payload)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Comment<'a> {
        author: &'a str,
        body: &'a str,
    }

    #[test]
    fn json_event_carries_serialized_record() {
        let Ok(room) = RoomId::new("offer-42") else {
            panic!("valid room");
        };
        let comment = Comment {
            author: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
            body: "is the rate negotiable?",
        };
        let Ok(event) = RoomEvent::json(room.clone(), &comment) else {
            panic!("comment should serialize");
        };
        assert_eq!(event.room(), &room);
        let text = String::from_utf8_lossy(event.payload());
        assert!(text.contains("\"body\":\"is the rate negotiable?\""));
    }

    #[test]
    fn payload_is_kept_verbatim() {
        let raw: &'static [u8] = &[0x00, 0xff, 0x10];
        let event = RoomEvent::new(RoomId::offers_feed(), raw);
        let (room, payload) = event.into_parts();
        assert_eq!(room, RoomId::offers_feed());
        assert_eq!(payload.as_ref(), raw);
    }
}
