//! UI layer: axum router, WebSocket and HTTP handlers.

mod handler;
mod scheduler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
