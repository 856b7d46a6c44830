//! Per-connection lifecycle state machine.
//!
//! ```text
//! Connecting -> Authenticating -> Active -> Closing -> Closed
//!     |               |                        ^
//!     +---------------+------------------------+   (rejected or aborted handshake)
//! ```

use super::error::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport accepted, no identity yet.
    Connecting,
    /// Verifying the bearer token.
    Authenticating,
    /// Registered and reading frames.
    Active,
    /// Deregistering and closing the transport.
    Closing,
    /// Terminal.
    Closed,
}

/// Tracks the state of one connection and rejects out-of-order transitions.
#[derive(Debug)]
pub struct ConnectionLifecycle {
    state: ConnectionState,
}

impl ConnectionLifecycle {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidTransition` if `next` does not follow the current state.
    pub fn transition(&mut self, next: ConnectionState) -> Result<(), LifecycleError> {
        use ConnectionState::*;

        let allowed = matches!(
            (self.state, next),
            (Connecting, Authenticating)
                | (Connecting, Closing)
                | (Authenticating, Active)
                | (Authenticating, Closing)
                | (Active, Closing)
                | (Closing, Closed)
        );
        if !allowed {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Enter `Closing` unless the connection is already closing or closed.
    ///
    /// Returns `true` only for the call that performed the transition, so cleanup
    /// guarded by it runs once.
    pub fn begin_close(&mut self) -> bool {
        match self.state {
            ConnectionState::Closing | ConnectionState::Closed => false,
            _ => self.transition(ConnectionState::Closing).is_ok(),
        }
    }
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
