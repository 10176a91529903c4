//! # lending-realtime
//!
//! Real-time broadcast broker for the lending marketplace backend.
//!
//! REST handlers publish newly created offers and comments to named rooms;
//! WebSocket clients subscribe to one room each and receive every payload
//! published there. Payloads are opaque bytes delivered verbatim,
//! at-most-once, best-effort per subscriber.
//!
//! ## Architecture
//!
//! ```text
//! Publishers (REST handlers)        Subscribers (WebSocket)
//!     │                                  │
//!     │ HubHandle::publish               ├── WS Handler (ws/)
//!     │                                  ├── Client pumps (ws/connection)
//!     ▼                                  ▼
//!     └──────────► Hub control loop (hub/) ◄──┘
//!                      │
//!                      └── RoomDirectory: room → {client → queue}
//! ```
//!
//! All directory mutation happens on the single hub task; every other
//! component talks to it through message passing.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod hub;
pub mod ws;
