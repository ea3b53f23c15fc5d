//! Request handlers.

mod http;
mod websocket;

pub use http::{get_active_rooms, get_archived_room, get_archived_rooms, health_check};
pub use websocket::websocket_handler;
