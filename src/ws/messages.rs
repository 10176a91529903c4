//! Wire framing of room payloads.
//!
//! Payloads are opaque and delivered byte-for-byte: valid UTF-8 goes out as
//! a Text frame so browser clients can `JSON.parse` it directly, anything
//! else as a Binary frame.

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, close_code};
use bytes::Bytes;

/// Close reason sent when the hub closes a subscriber's queue.
pub const CLOSE_REASON: &str = "subscription closed";

/// Maps a queued payload onto a WebSocket frame.
#[must_use]
pub fn payload_frame(payload: Bytes) -> Message {
    match std::str::from_utf8(&payload) {
        Ok(text) => Message::text(text),
        Err(_) => Message::Binary(payload),
    }
}

/// Normal-closure frame sent once the outbound queue has been closed.
#[must_use]
pub fn close_frame() -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static(CLOSE_REASON),
    }))
}

/// Keepalive ping with an empty body.
#[must_use]
pub fn ping_frame() -> Message {
    Message::Ping(Bytes::new())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn utf8_payload_becomes_text() {
        let frame = payload_frame(Bytes::from_static(br#"{"room":"offers"}"#));
        let Message::Text(text) = &frame else {
            panic!("expected text frame, got {frame:?}");
        };
        assert_eq!(text.as_str(), r#"{"room":"offers"}"#);
    }

    #[test]
    fn non_utf8_payload_becomes_binary() {
        let raw = Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);
        let frame = payload_frame(raw.clone());
        assert_eq!(frame, Message::Binary(raw));
    }

    #[test]
    fn close_frame_is_normal_closure() {
        let Message::Close(Some(frame)) = close_frame() else {
            panic!("expected close frame");
        };
        assert_eq!(frame.code, close_code::NORMAL);
        assert_eq!(frame.reason.as_str(), CLOSE_REASON);
    }
}
