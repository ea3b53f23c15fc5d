//! Utilities shared by the Parlor packages: logging bootstrap and time handling.

pub mod logger;
pub mod time;
