//! Domain layer: room identity, subscriber identity, and the event model.

pub mod client_id;
pub mod room_event;
pub mod room_id;

pub use client_id::ClientId;
pub use room_event::RoomEvent;
pub use room_id::RoomId;
