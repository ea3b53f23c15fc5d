//! Parlor chat relay server.
//!
//! Clients authenticate once per WebSocket, join rooms, exchange short text
//! messages, and rooms are archived after a period of inactivity.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
