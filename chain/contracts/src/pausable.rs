//! Pause lifecycle gate
//!
//! Authorization is decided by the caller of these methods; the controller
//! only enforces that every pause/unpause is a genuine transition and answers
//! whether protected operations may run.

use custody_types::ids::Address;
use serde::{Deserialize, Serialize};

use crate::errors::PauseError;
use crate::events::ContractEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseState {
    #[default]
    Active,
    Paused,
}

/// Binary gate consulted by state-mutating operations.
#[derive(Debug, Clone, Default)]
pub struct PauseController {
    state: PauseState,
}

impl PauseController {
    /// Create a controller in the `Active` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PauseState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    /// Active → Paused. Fails with `AlreadyPaused` if already paused.
    pub fn pause(&mut self, account: Address) -> Result<ContractEvent, PauseError> {
        if self.is_paused() {
            return Err(PauseError::AlreadyPaused);
        }
        self.state = PauseState::Paused;
        Ok(ContractEvent::Paused { account })
    }

    /// Paused → Active. Fails with `NotPaused` if active.
    pub fn unpause(&mut self, account: Address) -> Result<ContractEvent, PauseError> {
        if !self.is_paused() {
            return Err(PauseError::NotPaused);
        }
        self.state = PauseState::Active;
        Ok(ContractEvent::Unpaused { account })
    }

    /// Gate for operations disabled while paused.
    pub fn require_not_paused(&self) -> Result<(), PauseError> {
        if self.is_paused() {
            return Err(PauseError::EnforcedPause);
        }
        Ok(())
    }

    /// Gate for maintenance operations that only run while paused.
    pub fn require_paused(&self) -> Result<(), PauseError> {
        if !self.is_paused() {
            return Err(PauseError::ExpectedPause);
        }
        Ok(())
    }
}
