//! In-memory implementations backed by `HashMap`/`BTreeMap` behind a
//! `tokio::sync::Mutex`. Each lock is held only for the map operation itself.

mod activity;
mod presence;
mod room;

pub use activity::InMemoryActivityRepository;
pub use presence::InMemoryPresenceRepository;
pub use room::InMemoryRoomRepository;
