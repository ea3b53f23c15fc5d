//! Infrastructure layer: in-memory stores, wire DTOs and WebSocket delivery.

pub mod dto;
pub mod message_pusher;
pub mod repository;
