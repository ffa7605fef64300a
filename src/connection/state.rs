//! Connection state machine

use crate::{Error, Result};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No handle owned
    #[default]
    Disconnected,

    /// Handle owned, autocommit as configured on the handle
    Connected,

    /// Handle owned, explicit transaction open (autocommit disabled)
    InTransaction,
}

impl ConnectionState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        matches!(
            (self, next),
            (Disconnected, Connected)
                | (Connected, InTransaction)
                | (InTransaction, Connected)
                | (_, Disconnected)
        )
    }

    /// Transition to new state
    pub fn transition(&mut self, next: ConnectionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState {
                expected: format!("valid transition from {}", self),
                actual: next.to_string(),
            });
        }
        tracing::trace!("connection state {} -> {}", self, next);
        *self = next;
        Ok(())
    }

    /// True unless disconnected
    pub fn has_handle(&self) -> bool {
        !matches!(self, ConnectionState::Disconnected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::InTransaction => write!(f, "in_transaction"),
        }
    }
}
