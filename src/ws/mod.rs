//! WebSocket layer: upgrade handling, subscriber pumps, frame mapping.
//!
//! The endpoint at `/api/v1/ws/{room_id}` subscribes the connection to a
//! single room. Subscribers only receive; anything they send is ignored.

pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::{Client, subscribe};
