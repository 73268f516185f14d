//! Connection establishment state machine

use crate::metrics::labels;
use crate::{Error, Result};

/// Establishment state
///
/// A failure leaves the machine in the state that failed; that state names
/// the terminal outcome (client init, session open, response validation or
/// parameter replay).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstablishState {
    /// Nothing started
    Idle,

    /// Building the RPC client
    ClientInitializing,

    /// Open-session call in flight under the sentinel
    SessionOpening,

    /// Checking the open-session response
    ResponseValidating,

    /// Replaying session parameters
    ParameterApplying,

    /// Connection handed to the caller
    Ready,
}

impl EstablishState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: EstablishState) -> bool {
        use EstablishState::*;

        matches!(
            (self, next),
            (Idle, ClientInitializing)
                | (ClientInitializing, SessionOpening)
                | (SessionOpening, ResponseValidating)
                | (ResponseValidating, ParameterApplying)
                | (ParameterApplying, Ready)
        )
    }

    /// Transition to new state
    pub fn transition(&mut self, next: EstablishState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState {
                expected: format!("valid transition from {:?}", self),
                actual: format!("{:?}", next),
            });
        }
        *self = next;
        Ok(())
    }

    /// Metrics stage label for a failure in this state
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Idle | Self::ClientInitializing => labels::STAGE_CLIENT_INIT,
            Self::SessionOpening => labels::STAGE_SESSION_OPEN,
            Self::ResponseValidating => labels::STAGE_RESPONSE,
            Self::ParameterApplying | Self::Ready => labels::STAGE_SESSION_PARAMS,
        }
    }
}

impl std::fmt::Display for EstablishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::ClientInitializing => write!(f, "client_initializing"),
            Self::SessionOpening => write!(f, "session_opening"),
            Self::ResponseValidating => write!(f, "response_validating"),
            Self::ParameterApplying => write!(f, "parameter_applying"),
            Self::Ready => write!(f, "ready"),
        }
    }
}
