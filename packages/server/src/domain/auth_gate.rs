//! Per-socket authentication state machine.
//!
//! ```text
//! AwaitingAuth --auth ok--> Authenticated --close--> Closed
//! AwaitingAuth --close----> Closed
//! AwaitingAuth --timeout--> Rejected (terminal)
//! ```
//!
//! Only `Authenticated` lets room and message operations through.

use super::{ClientId, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingAuth,
    Authenticated(ClientId),
    Rejected(ErrorCode),
    Closed,
}

#[derive(Debug)]
pub struct AuthGate {
    state: ConnectionState,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::AwaitingAuth,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_awaiting_auth(&self) -> bool {
        matches!(self.state, ConnectionState::AwaitingAuth)
    }

    /// Validate an `auth` request without changing state.
    ///
    /// The caller registers the returned identity and then calls
    /// [`AuthGate::accept`].
    pub fn check_auth(&self, user_id: Option<String>) -> Result<ClientId, ErrorCode> {
        match self.state {
            ConnectionState::AwaitingAuth => user_id
                .and_then(|raw| ClientId::new(raw).ok())
                .ok_or(ErrorCode::Unauthorized),
            ConnectionState::Authenticated(_) => Err(ErrorCode::AlreadyAuthenticated),
            ConnectionState::Rejected(_) | ConnectionState::Closed => Err(ErrorCode::Unauthorized),
        }
    }

    pub fn accept(&mut self, client_id: ClientId) {
        if self.is_awaiting_auth() {
            self.state = ConnectionState::Authenticated(client_id);
        }
    }

    /// Identity to dispatch a room or message operation as
    pub fn authorize(&self) -> Result<&ClientId, ErrorCode> {
        match &self.state {
            ConnectionState::Authenticated(client_id) => Ok(client_id),
            _ => Err(ErrorCode::Unauthorized),
        }
    }

    /// Auth deadline passed. Returns the code to close with, or `None` if the
    /// socket already left `AwaitingAuth`.
    pub fn time_out(&mut self) -> Option<ErrorCode> {
        if !self.is_awaiting_auth() {
            return None;
        }
        self.state = ConnectionState::Rejected(ErrorCode::AuthTimeout);
        Some(ErrorCode::AuthTimeout)
    }

    /// Socket went away. Returns the identity that was authenticated, if any.
    pub fn close(&mut self) -> Option<ClientId> {
        if matches!(self.state, ConnectionState::Rejected(_)) {
            return None;
        }
        match std::mem::replace(&mut self.state, ConnectionState::Closed) {
            ConnectionState::Authenticated(client_id) => Some(client_id),
            _ => None,
        }
    }
}
