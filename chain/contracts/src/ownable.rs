//! Single-owner authorization with immediate or two-step transfer
//!
//! [`Ownable`] hands ownership over in one call and refuses the null identity;
//! [`Ownable2Step`] only stages a pending owner, who must accept before the
//! handoff takes effect. [`OwnershipManager`] picks one according to
//! [`OwnershipMode`].

use custody_types::ids::Address;

use crate::config::OwnershipMode;
use crate::errors::OwnershipError;
use crate::events::{ContractEvent, OwnershipTransferStarted, OwnershipTransferred};

/// Immediate-transfer ownership.
#[derive(Debug, Clone)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Current owner; the null identity after renunciation.
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn check_owner(&self, caller: &Address) -> Result<(), OwnershipError> {
        if caller.is_zero() || *caller != self.owner {
            return Err(OwnershipError::Unauthorized { account: *caller });
        }
        Ok(())
    }

    /// Replace the owner. The null identity is rejected; use
    /// [`Ownable::renounce_ownership`] to leave the contract ownerless.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        self.check_owner(caller)?;
        if new_owner.is_zero() {
            return Err(OwnershipError::InvalidOwner { owner: new_owner });
        }
        Ok(self.set_owner(new_owner))
    }

    /// Set the owner to the null identity. Owner-gated operations become
    /// unreachable afterwards.
    pub fn renounce_ownership(
        &mut self,
        caller: &Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        self.check_owner(caller)?;
        Ok(self.set_owner(Address::ZERO))
    }

    fn set_owner(&mut self, new_owner: Address) -> OwnershipTransferred {
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        OwnershipTransferred {
            previous_owner,
            new_owner,
        }
    }
}

/// Two-step ownership: transfer stages, acceptance completes.
#[derive(Debug, Clone)]
pub struct Ownable2Step {
    inner: Ownable,
    pending_owner: Option<Address>,
}

impl Ownable2Step {
    pub fn new(owner: Address) -> Self {
        Self {
            inner: Ownable::new(owner),
            pending_owner: None,
        }
    }

    pub fn owner(&self) -> Address {
        self.inner.owner()
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.pending_owner
    }

    pub fn check_owner(&self, caller: &Address) -> Result<(), OwnershipError> {
        self.inner.check_owner(caller)
    }

    /// Stage `new_owner`. Staging the null identity cancels any pending transfer.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<OwnershipTransferStarted, OwnershipError> {
        self.inner.check_owner(caller)?;
        self.pending_owner = (!new_owner.is_zero()).then_some(new_owner);
        Ok(OwnershipTransferStarted {
            previous_owner: self.inner.owner(),
            new_owner,
        })
    }

    /// Complete a staged transfer. Only the pending owner may call this.
    pub fn accept_ownership(
        &mut self,
        caller: &Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        match self.pending_owner {
            Some(pending) if pending == *caller => {
                self.pending_owner = None;
                Ok(self.inner.set_owner(pending))
            }
            _ => Err(OwnershipError::Unauthorized { account: *caller }),
        }
    }

    /// Renounce and discard any pending transfer.
    pub fn renounce_ownership(
        &mut self,
        caller: &Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        let transferred = self.inner.renounce_ownership(caller)?;
        self.pending_owner = None;
        Ok(transferred)
    }
}

/// Ownership variant selected by configuration.
#[derive(Debug, Clone)]
pub enum OwnershipManager {
    Immediate(Ownable),
    TwoStep(Ownable2Step),
}

impl OwnershipManager {
    pub fn new(mode: OwnershipMode, owner: Address) -> Self {
        match mode {
            OwnershipMode::Immediate => OwnershipManager::Immediate(Ownable::new(owner)),
            OwnershipMode::TwoStep => OwnershipManager::TwoStep(Ownable2Step::new(owner)),
        }
    }

    pub fn mode(&self) -> OwnershipMode {
        match self {
            OwnershipManager::Immediate(_) => OwnershipMode::Immediate,
            OwnershipManager::TwoStep(_) => OwnershipMode::TwoStep,
        }
    }

    pub fn owner(&self) -> Address {
        match self {
            OwnershipManager::Immediate(o) => o.owner(),
            OwnershipManager::TwoStep(o) => o.owner(),
        }
    }

    /// Always `None` in immediate mode.
    pub fn pending_owner(&self) -> Option<Address> {
        match self {
            OwnershipManager::Immediate(_) => None,
            OwnershipManager::TwoStep(o) => o.pending_owner(),
        }
    }

    pub fn check_owner(&self, caller: &Address) -> Result<(), OwnershipError> {
        match self {
            OwnershipManager::Immediate(o) => o.check_owner(caller),
            OwnershipManager::TwoStep(o) => o.check_owner(caller),
        }
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<ContractEvent, OwnershipError> {
        match self {
            OwnershipManager::Immediate(o) => o
                .transfer_ownership(caller, new_owner)
                .map(ContractEvent::OwnershipTransferred),
            OwnershipManager::TwoStep(o) => o
                .transfer_ownership(caller, new_owner)
                .map(ContractEvent::OwnershipTransferStarted),
        }
    }

    pub fn accept_ownership(
        &mut self,
        caller: &Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        match self {
            OwnershipManager::Immediate(_) => Err(OwnershipError::TwoStepDisabled),
            OwnershipManager::TwoStep(o) => o.accept_ownership(caller),
        }
    }

    pub fn renounce_ownership(
        &mut self,
        caller: &Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        match self {
            OwnershipManager::Immediate(o) => o.renounce_ownership(caller),
            OwnershipManager::TwoStep(o) => o.renounce_ownership(caller),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployer() -> Address {
        Address::from_label("deployer")
    }

    fn new_owner() -> Address {
        Address::from_label("new_owner")
    }

    fn non_owner() -> Address {
        Address::from_label("non_owner")
    }

    // --- Ownable ---

    #[test]
    fn test_owner_is_deployer() {
        let ownable = Ownable::new(deployer());
        assert_eq!(ownable.owner(), deployer());
        assert!(ownable.check_owner(&deployer()).is_ok());
    }

    #[test]
    fn test_non_owner_rejected() {
        let ownable = Ownable::new(deployer());
        assert_eq!(
            ownable.check_owner(&non_owner()),
            Err(OwnershipError::Unauthorized {
                account: non_owner()
            })
        );
    }

    #[test]
    fn test_transfer_to_zero_rejected() {
        let mut ownable = Ownable::new(deployer());
        let result = ownable.transfer_ownership(&deployer(), Address::ZERO);
        assert_eq!(
            result,
            Err(OwnershipError::InvalidOwner {
                owner: Address::ZERO
            })
        );
        assert_eq!(ownable.owner(), deployer());
    }

    #[test]
    fn test_transfer_ownership() {
        let mut ownable = Ownable::new(deployer());
        let event = ownable.transfer_ownership(&deployer(), new_owner()).unwrap();
        assert_eq!(event.previous_owner, deployer());
        assert_eq!(ownable.owner(), new_owner());
        assert!(ownable.check_owner(&deployer()).is_err());
    }

    #[test]
    fn test_non_owner_cannot_renounce() {
        let mut ownable = Ownable::new(deployer());
        assert!(matches!(
            ownable.renounce_ownership(&non_owner()),
            Err(OwnershipError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_renounce_leaves_no_owner() {
        let mut ownable = Ownable::new(deployer());
        ownable.renounce_ownership(&deployer()).unwrap();
        assert!(ownable.owner().is_zero());
        // The null identity can never pass the owner check
        assert!(ownable.check_owner(&Address::ZERO).is_err());
    }

    // --- Ownable2Step ---

    #[test]
    fn test_two_step_sets_pending_owner() {
        let mut ownable = Ownable2Step::new(deployer());
        ownable.transfer_ownership(&deployer(), new_owner()).unwrap();
        assert_eq!(ownable.pending_owner(), Some(new_owner()));
        assert_eq!(ownable.owner(), deployer());
    }

    #[test]
    fn test_two_step_accept() {
        let mut ownable = Ownable2Step::new(deployer());
        ownable.transfer_ownership(&deployer(), new_owner()).unwrap();
        let event = ownable.accept_ownership(&new_owner()).unwrap();
        assert_eq!(event.new_owner, new_owner());
        assert_eq!(ownable.owner(), new_owner());
        assert_eq!(ownable.pending_owner(), None);
    }

    #[test]
    fn test_two_step_other_account_cannot_accept() {
        let mut ownable = Ownable2Step::new(deployer());
        ownable.transfer_ownership(&deployer(), new_owner()).unwrap();
        let result = ownable.accept_ownership(&non_owner());
        assert_eq!(
            result,
            Err(OwnershipError::Unauthorized {
                account: non_owner()
            })
        );
        assert_eq!(ownable.owner(), deployer());
        assert_eq!(ownable.pending_owner(), Some(new_owner()));
    }

    #[test]
    fn test_two_step_zero_pending_cancels() {
        let mut ownable = Ownable2Step::new(deployer());
        ownable.transfer_ownership(&deployer(), new_owner()).unwrap();
        let started = ownable.transfer_ownership(&deployer(), Address::ZERO).unwrap();
        assert!(started.new_owner.is_zero());
        assert_eq!(ownable.pending_owner(), None);
        assert!(ownable.accept_ownership(&new_owner()).is_err());
        assert!(ownable.accept_ownership(&Address::ZERO).is_err());
    }

    #[test]
    fn test_two_step_renounce_clears_pending() {
        let mut ownable = Ownable2Step::new(deployer());
        ownable.transfer_ownership(&deployer(), new_owner()).unwrap();
        ownable.renounce_ownership(&deployer()).unwrap();
        assert!(ownable.owner().is_zero());
        assert_eq!(ownable.pending_owner(), None);
    }

    // --- OwnershipManager ---

    #[test]
    fn test_manager_immediate_rejects_accept() {
        let mut manager = OwnershipManager::new(OwnershipMode::Immediate, deployer());
        assert_eq!(
            manager.accept_ownership(&deployer()),
            Err(OwnershipError::TwoStepDisabled)
        );
        assert_eq!(manager.pending_owner(), None);
    }

    #[test]
    fn test_manager_event_variant_per_mode() {
        let mut immediate = OwnershipManager::new(OwnershipMode::Immediate, deployer());
        let event = immediate.transfer_ownership(&deployer(), new_owner()).unwrap();
        assert!(matches!(event, ContractEvent::OwnershipTransferred(_)));

        let mut two_step = OwnershipManager::new(OwnershipMode::TwoStep, deployer());
        let event = two_step.transfer_ownership(&deployer(), new_owner()).unwrap();
        assert!(matches!(event, ContractEvent::OwnershipTransferStarted(_)));
        assert_eq!(two_step.owner(), deployer());
        assert_eq!(two_step.mode(), OwnershipMode::TwoStep);
    }
}
