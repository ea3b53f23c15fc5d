//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs (inbound and outbound)
//! - `http`: HTTP API response DTOs
//!
//! `conversion` maps domain values onto them.

pub mod conversion;
pub mod http;
pub mod websocket;
