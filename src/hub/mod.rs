//! Real-time broadcast hub.
//!
//! A single control task ([`Hub`]) owns the room directory; everything
//! else reaches it through a [`HubHandle`]. Each subscriber is represented
//! inside the directory by a [`ClientHandle`], the producer half of that
//! subscriber's bounded outbound queue.
//!
//! ```text
//! Publisher ──broadcast──┐
//! Client ──register──────┼──► Hub loop ──try_send──► ClientHandle queue ──► pump ──► socket
//! Client ──unregister────┘     (owns RoomDirectory)
//! ```

pub mod client_handle;
pub mod control;
pub mod directory;
pub mod handle;

pub use client_handle::{ClientHandle, DropReason};
pub use control::Hub;
pub use directory::{DirectoryStats, RoomStats};
pub use handle::HubHandle;
