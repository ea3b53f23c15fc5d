//! Value objects of the relay domain.
//!
//! Every user-supplied string is validated (and, where it ends up rendered by
//! clients, HTML-escaped) when the value object is built, so the rest of the
//! crate never sees unchecked input.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a client identity, in characters
pub const MAX_CLIENT_ID_LENGTH: usize = 64;
/// Maximum length of a chat message, in characters, measured before escaping
pub const MAX_MESSAGE_LENGTH: usize = 200;
/// Maximum length of a per-room nickname, in characters
pub const MAX_NICKNAME_LENGTH: usize = 32;
/// Maximum length of a room name, in characters
pub const MAX_ROOM_NAME_LENGTH: usize = 64;

/// Escape the characters that are significant in HTML markup.
pub fn escape_markup(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Trim `raw` and check it against `max` characters.
fn bounded_text(raw: &str, max: usize, field: &'static str) -> Result<String, ValueObjectError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let length = trimmed.chars().count();
    if length > max {
        return Err(ValueObjectError::TooLong { field, max, length });
    }
    Ok(trimmed.to_string())
}

/// Opaque identity of a client across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        bounded_text(&raw, MAX_CLIENT_ID_LENGTH, "client_id").map(Self)
    }

    /// Issue a fresh identity for a client that has none
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one live socket. A client reconnecting gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Store-assigned room identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(i64);

impl RoomId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Store-assigned message identifier. Ordering follows persist order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Room display name (trimmed, escaped)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        bounded_text(&raw, MAX_ROOM_NAME_LENGTH, "room_name").map(|name| Self(escape_markup(&name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Nickname a connection uses inside one room (trimmed, escaped)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        bounded_text(&raw, MAX_NICKNAME_LENGTH, "nickname").map(|name| Self(escape_markup(&name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Chat message body. Trimmed, length-capped, then escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(raw: String) -> Result<Self, ValueObjectError> {
        bounded_text(&raw, MAX_MESSAGE_LENGTH, "content").map(|text| Self(escape_markup(&text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Room capacity requested at creation time: a positive whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxParticipants(i64);

impl MaxParticipants {
    /// Accepts JSON-style numbers; rejects zero, negatives, fractions and
    /// anything that is not finite.
    pub fn new(requested: f64) -> Result<Self, ValueObjectError> {
        if !requested.is_finite() || requested < 1.0 || requested.fract() != 0.0 {
            return Err(ValueObjectError::NotPositiveInteger("max_participants"));
        }
        if requested > i64::from(u32::MAX) as f64 {
            return Err(ValueObjectError::NotPositiveInteger("max_participants"));
        }
        Ok(Self(requested as i64))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
