//! Chat-room relay library.
//!
//! Clients join named rooms over WebSocket, broadcast text messages to a room
//! and receive participant-presence updates.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
