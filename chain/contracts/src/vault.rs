//! Vault: role, ownership, pause and ledger state behind one entry point
//!
//! Every operation takes the calling identity explicitly. State lives in a
//! single record that is never borrowed across a counterparty call, so a
//! recipient hook holding `&Vault` can call back in without deadlocking or
//! aliasing a live borrow.
//!
//! Ledger calls run in this order:
//! 1. Pause state
//! 2. Authorization (holder, operator or owner)
//! 3. Validation
//! 4. Reentrancy guard
//! 5. Balance mutation
//! 6. External transfer
//!
//! Calls that move value run inside [`Vault::atomically`]: any error restores
//! the state record as it was on entry, including changes made by nested calls
//! and the events they emitted.

use custody_types::ids::{Address, AssetId, RoleId};
use custody_types::numeric::is_positive;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::access::{pauser_role, RoleRegistry};
use crate::config::{ConfigError, OwnershipMode, PauseAuthority, VaultConfig};
use crate::counterparty::{AssetCounterparty, TransferFailure};
use crate::errors::{LedgerError, VaultError};
use crate::events::{
    ContractEvent, Deposit, EventRecord, OperatorUpdated, OwnershipTransferred, RoleGranted,
    SurplusRecovered, Withdraw,
};
use crate::ledger::AssetLedger;
use crate::ownable::OwnershipManager;
use crate::pausable::PauseController;
use crate::security::{Entered, ReentrancyGuard};

#[derive(Debug)]
struct VaultState {
    roles: RoleRegistry,
    ownership: OwnershipManager,
    pause: PauseController,
    ledger: AssetLedger,
    /// (holder, operator) pairs allowed to withdraw on the holder's behalf
    operators: HashSet<(Address, Address)>,
    /// Emitted events log (append-only, rolled back with failed calls)
    events: Vec<EventRecord>,
    next_sequence: u64,
}

impl VaultState {
    fn emit(&mut self, event: ContractEvent) {
        self.next_sequence += 1;
        debug!(sequence = self.next_sequence, event = event.name(), "Event emitted");
        self.events.push(EventRecord::new(self.next_sequence, event));
    }

    /// Capture everything a failed call must be able to put back. The event
    /// log is append-only within a call, so only its length is kept.
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            roles: self.roles.clone(),
            ownership: self.ownership.clone(),
            pause: self.pause.clone(),
            ledger: self.ledger.clone(),
            operators: self.operators.clone(),
            event_count: self.events.len(),
            next_sequence: self.next_sequence,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.roles = checkpoint.roles;
        self.ownership = checkpoint.ownership;
        self.pause = checkpoint.pause;
        self.ledger = checkpoint.ledger;
        self.operators = checkpoint.operators;
        self.events.truncate(checkpoint.event_count);
        self.next_sequence = checkpoint.next_sequence;
    }
}

struct Checkpoint {
    roles: RoleRegistry,
    ownership: OwnershipManager,
    pause: PauseController,
    ledger: AssetLedger,
    operators: HashSet<(Address, Address)>,
    event_count: usize,
    next_sequence: u64,
}

/// Custody vault holding value on behalf of many holders.
///
/// `Vault` is `Send` but not `Sync`: hosts that share it between threads wrap
/// it in a `Mutex`. Reentrant calls arrive through the `&Vault` handed to
/// recipient hooks and never touch that lock.
pub struct Vault {
    /// Identity the vault holds custody under on every counterparty
    address: Address,
    config: VaultConfig,
    state: RefCell<VaultState>,
    guard: ReentrancyGuard,
    counterparties: HashMap<AssetId, Arc<dyn AssetCounterparty>>,
}

impl Vault {
    /// Create a vault with the default configuration. `deployer` becomes the
    /// owner and holds the default admin role.
    pub fn new(deployer: Address) -> Self {
        Self::build(deployer, VaultConfig::default())
    }

    /// Create a vault from an explicit configuration.
    pub fn with_config(deployer: Address, config: VaultConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(deployer, config))
    }

    fn build(deployer: Address, config: VaultConfig) -> Self {
        let mut state = VaultState {
            roles: RoleRegistry::new(deployer),
            ownership: OwnershipManager::new(config.ownership, deployer),
            pause: PauseController::new(),
            ledger: AssetLedger::new(),
            operators: HashSet::new(),
            events: Vec::new(),
            next_sequence: 0,
        };

        state.emit(ContractEvent::RoleGranted(RoleGranted {
            role: RoleId::DEFAULT_ADMIN,
            account: deployer,
            sender: deployer,
        }));
        state.emit(ContractEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: deployer,
        }));
        for pauser in &config.pausers {
            if let Some(event) = state.roles.grant_unchecked(pauser_role(), *pauser, deployer) {
                state.emit(ContractEvent::RoleGranted(event));
            }
        }

        let address = Address::new();
        info!(
            vault = %address,
            %deployer,
            ownership = ?config.ownership,
            pause_authority = ?config.pause_authority,
            pausers = config.pausers.len(),
            "Vault created"
        );

        Self {
            address,
            config,
            state: RefCell::new(state),
            guard: ReentrancyGuard::new(),
            counterparties: HashMap::new(),
        }
    }

    /// Register the counterparty for an asset. Deposits and withdrawals of
    /// unregistered assets fail with `UnsupportedAsset`.
    pub fn register_asset(&mut self, counterparty: Arc<dyn AssetCounterparty>) {
        let asset = counterparty.asset();
        info!(vault = %self.address, %asset, "Asset registered");
        self.counterparties.insert(asset, counterparty);
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn supports(&self, asset: &AssetId) -> bool {
        self.counterparties.contains_key(asset)
    }

    // ───────────────────────── Roles ─────────────────────────

    /// Grant `role` to `account`. Returns `false` if it was already held.
    pub fn grant_role(&self, caller: Address, role: RoleId, account: Address) -> Result<bool, VaultError> {
        self.update(|state| {
            let Some(event) = state.roles.grant_role(&caller, role, account)? else {
                return Ok(false);
            };
            info!(%role, %account, sender = %caller, "Role granted");
            state.emit(ContractEvent::RoleGranted(event));
            Ok(true)
        })
    }

    /// Revoke `role` from `account`. Returns `false` if it was not held.
    pub fn revoke_role(&self, caller: Address, role: RoleId, account: Address) -> Result<bool, VaultError> {
        self.update(|state| {
            let Some(event) = state.roles.revoke_role(&caller, role, account)? else {
                return Ok(false);
            };
            info!(%role, %account, sender = %caller, "Role revoked");
            state.emit(ContractEvent::RoleRevoked(event));
            Ok(true)
        })
    }

    /// Drop a role held by the caller. `account` must be the caller.
    pub fn renounce_role(&self, caller: Address, role: RoleId, account: Address) -> Result<bool, VaultError> {
        self.update(|state| {
            let Some(event) = state.roles.renounce_role(&caller, role, account)? else {
                return Ok(false);
            };
            info!(%role, %account, "Role renounced");
            state.emit(ContractEvent::RoleRevoked(event));
            Ok(true)
        })
    }

    pub fn set_role_admin(&self, caller: Address, role: RoleId, admin_role: RoleId) -> Result<(), VaultError> {
        self.update(|state| {
            let event = state.roles.set_role_admin(&caller, role, admin_role)?;
            info!(%role, previous = %event.previous_admin_role, new = %admin_role, "Role admin changed");
            state.emit(ContractEvent::RoleAdminChanged(event));
            Ok(())
        })
    }

    pub fn has_role(&self, role: &RoleId, account: &Address) -> bool {
        self.state.borrow().roles.has_role(role, account)
    }

    pub fn role_admin(&self, role: &RoleId) -> RoleId {
        self.state.borrow().roles.role_admin(role)
    }

    pub fn members(&self, role: &RoleId) -> Vec<Address> {
        self.state.borrow().roles.members(role)
    }

    // ───────────────────────── Ownership ─────────────────────────

    /// Immediate mode hands over at once; two-step mode stages `new_owner`
    /// (the null identity cancels a staged transfer).
    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), VaultError> {
        self.update(|state| {
            let event = state.ownership.transfer_ownership(&caller, new_owner)?;
            info!(%caller, %new_owner, event = event.name(), "Ownership transfer");
            state.emit(event);
            Ok(())
        })
    }

    /// Complete a staged two-step transfer. Only the pending owner may call.
    pub fn accept_ownership(&self, caller: Address) -> Result<(), VaultError> {
        self.update(|state| {
            let event = state.ownership.accept_ownership(&caller)?;
            info!(previous = %event.previous_owner, new_owner = %caller, "Ownership accepted");
            state.emit(ContractEvent::OwnershipTransferred(event));
            Ok(())
        })
    }

    /// Leave the vault without an owner. Owner-only operations become
    /// unreachable.
    pub fn renounce_ownership(&self, caller: Address) -> Result<(), VaultError> {
        self.update(|state| {
            let event = state.ownership.renounce_ownership(&caller)?;
            warn!(previous = %event.previous_owner, "Ownership renounced");
            state.emit(ContractEvent::OwnershipTransferred(event));
            Ok(())
        })
    }

    /// Current owner; the null identity once renounced.
    pub fn owner(&self) -> Address {
        self.state.borrow().ownership.owner()
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.state.borrow().ownership.pending_owner()
    }

    pub fn ownership_mode(&self) -> OwnershipMode {
        self.state.borrow().ownership.mode()
    }

    // ───────────────────────── Pause ─────────────────────────

    pub fn pause(&self, caller: Address) -> Result<(), VaultError> {
        self.update(|state| {
            self.check_pause_authority(state, &caller)?;
            let event = state.pause.pause(caller)?;
            info!(account = %caller, "Vault paused");
            state.emit(event);
            Ok(())
        })
    }

    pub fn unpause(&self, caller: Address) -> Result<(), VaultError> {
        self.update(|state| {
            self.check_pause_authority(state, &caller)?;
            let event = state.pause.unpause(caller)?;
            info!(account = %caller, "Vault unpaused");
            state.emit(event);
            Ok(())
        })
    }

    pub fn paused(&self) -> bool {
        self.state.borrow().pause.is_paused()
    }

    fn check_pause_authority(&self, state: &VaultState, caller: &Address) -> Result<(), VaultError> {
        match self.config.pause_authority {
            PauseAuthority::Owner => state.ownership.check_owner(caller)?,
            PauseAuthority::PauserRole => state.roles.check_role(&pauser_role(), caller)?,
            PauseAuthority::OwnerOrPauser => {
                if state.ownership.check_owner(caller).is_err() {
                    state.roles.check_role(&pauser_role(), caller)?;
                }
            }
        }
        Ok(())
    }

    // ───────────────────────── Ledger ─────────────────────────

    /// Credit `amount` to the caller, then pull it from the caller through the
    /// asset's counterparty. Returns the caller's new balance.
    pub fn deposit(&self, caller: Address, asset: AssetId, amount: Decimal) -> Result<Decimal, VaultError> {
        self.state.borrow().pause.require_not_paused()?;
        validate_amount(amount)?;
        let counterparty = self.counterparty(&asset)?;
        let entered = self.enter("deposit")?;

        self.atomically(|| {
            let balance = self.update(|state| {
                let balance = state.ledger.credit(caller, asset, amount)?;
                state.emit(ContractEvent::Deposit(Deposit {
                    holder: caller,
                    asset,
                    amount,
                }));
                Ok(balance)
            })?;

            counterparty
                .transfer_in(self, caller, amount)
                .map_err(|failure| transfer_error(&entered, asset, amount, failure))?;

            debug!(holder = %caller, %asset, %amount, %balance, "Deposit credited");
            Ok(balance)
        })
    }

    /// Withdraw the caller's own balance to `recipient`. Returns the caller's
    /// remaining balance.
    pub fn withdraw(
        &self,
        caller: Address,
        recipient: Address,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<Decimal, VaultError> {
        self.withdraw_from(caller, caller, recipient, asset, amount)
    }

    /// Withdraw from `holder`'s balance. The caller must be the holder or an
    /// operator the holder approved. The balance is debited before the value
    /// leaves custody.
    pub fn withdraw_from(
        &self,
        caller: Address,
        holder: Address,
        recipient: Address,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<Decimal, VaultError> {
        {
            let state = self.state.borrow();
            state.pause.require_not_paused()?;
            if caller != holder && !state.operators.contains(&(holder, caller)) {
                return Err(LedgerError::NotOperator {
                    holder,
                    operator: caller,
                }
                .into());
            }
        }
        validate_amount(amount)?;
        if recipient.is_zero() {
            return Err(LedgerError::InvalidRecipient { recipient }.into());
        }
        let counterparty = self.counterparty(&asset)?;
        let entered = self.enter("withdraw")?;

        self.atomically(|| {
            let remaining = self.update(|state| Ok(state.ledger.debit(holder, asset, amount)?))?;

            counterparty
                .transfer_out(self, recipient, amount)
                .map_err(|failure| transfer_error(&entered, asset, amount, failure))?;

            self.update(|state| {
                state.emit(ContractEvent::Withdraw(Withdraw {
                    holder,
                    asset,
                    amount,
                }));
                Ok(())
            })?;
            debug!(%holder, %recipient, %asset, %amount, %remaining, "Withdrawal sent");
            Ok(remaining)
        })
    }

    /// Approve or revoke `operator` to withdraw on the caller's behalf.
    pub fn set_operator(&self, caller: Address, operator: Address, approved: bool) -> Result<(), VaultError> {
        self.update(|state| {
            state.pause.require_not_paused()?;
            if approved {
                state.operators.insert((caller, operator));
            } else {
                state.operators.remove(&(caller, operator));
            }
            info!(holder = %caller, %operator, approved, "Operator updated");
            state.emit(ContractEvent::OperatorUpdated(OperatorUpdated {
                holder: caller,
                operator,
                approved,
            }));
            Ok(())
        })
    }

    pub fn is_operator(&self, holder: &Address, operator: &Address) -> bool {
        self.state.borrow().operators.contains(&(*holder, *operator))
    }

    /// Sweep custodied value that no holder has a claim on. Owner-only and
    /// only while paused. Returns the amount recovered.
    pub fn recover_surplus(&self, caller: Address, asset: AssetId, to: Address) -> Result<Decimal, VaultError> {
        {
            let state = self.state.borrow();
            state.pause.require_paused()?;
            state.ownership.check_owner(&caller)?;
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient { recipient: to }.into());
        }
        let counterparty = self.counterparty(&asset)?;
        let entered = self.enter("recover_surplus")?;
        let surplus = counterparty.balance_of(&self.address) - self.total_recorded(&asset);
        if surplus <= Decimal::ZERO {
            return Err(LedgerError::NoSurplus { asset }.into());
        }

        self.atomically(|| {
            counterparty
                .transfer_out(self, to, surplus)
                .map_err(|failure| transfer_error(&entered, asset, surplus, failure))?;
            self.update(|state| {
                state.emit(ContractEvent::SurplusRecovered(SurplusRecovered {
                    asset,
                    to,
                    amount: surplus,
                }));
                Ok(())
            })?;
            info!(%asset, %to, amount = %surplus, "Surplus recovered");
            Ok(surplus)
        })
    }

    /// Withdrawal without the guard that pushes value before writing the
    /// balance it read up front. A recipient that re-enters sees the old
    /// balance every time and can drain other holders' value.
    ///
    /// Only compiled for tests and the `unguarded-baseline` feature, to
    /// demonstrate that attack.
    #[cfg(any(test, feature = "unguarded-baseline"))]
    pub fn withdraw_unguarded(
        &self,
        caller: Address,
        recipient: Address,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<Decimal, VaultError> {
        warn!(%caller, %asset, %amount, "Unguarded withdrawal");
        self.state.borrow().pause.require_not_paused()?;
        validate_amount(amount)?;
        if recipient.is_zero() {
            return Err(LedgerError::InvalidRecipient { recipient }.into());
        }
        let counterparty = self.counterparty(&asset)?;

        let available = self.get_balance(&caller, &asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                holder: caller,
                asset,
                requested: amount,
                available,
            }
            .into());
        }

        counterparty
            .transfer_out(self, recipient, amount)
            .map_err(|failure| LedgerError::TransferFailed {
                asset,
                amount,
                reason: failure.to_string(),
            })?;

        let remaining = available - amount;
        self.update(|state| {
            state.ledger.overwrite(caller, asset, remaining);
            state.emit(ContractEvent::Withdraw(Withdraw {
                holder: caller,
                asset,
                amount,
            }));
            Ok(remaining)
        })
    }

    pub fn get_balance(&self, holder: &Address, asset: &AssetId) -> Decimal {
        self.state.borrow().ledger.balance(holder, asset)
    }

    /// Sum of all holder balances for `asset`.
    pub fn total_recorded(&self, asset: &AssetId) -> Decimal {
        self.state.borrow().ledger.total(asset)
    }

    /// Value the counterparty reports the vault holding. Zero for assets
    /// that are not registered.
    pub fn custodied(&self, asset: &AssetId) -> Decimal {
        self.counterparties
            .get(asset)
            .map_or(Decimal::ZERO, |c| c.balance_of(&self.address))
    }

    /// Whether every recorded balance for `asset` is backed by custody.
    pub fn is_solvent(&self, asset: &AssetId) -> bool {
        self.total_recorded(asset) <= self.custodied(asset)
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> Vec<EventRecord> {
        self.state.borrow().events.clone()
    }

    /// Take all recorded events. Sequence numbers keep counting.
    pub fn drain_events(&self) -> Vec<EventRecord> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    // ───────────────────────── Internal ─────────────────────────

    /// Run `f` against the state record. The borrow ends before `f` returns,
    /// so `f` must not call out of the vault.
    fn update<T>(&self, f: impl FnOnce(&mut VaultState) -> Result<T, VaultError>) -> Result<T, VaultError> {
        f(&mut self.state.borrow_mut())
    }

    /// Run `f` with all-or-nothing semantics. On error the state record is
    /// restored to its value on entry.
    fn atomically<T>(&self, f: impl FnOnce() -> Result<T, VaultError>) -> Result<T, VaultError> {
        let checkpoint = self.state.borrow().checkpoint();
        f().map_err(|err| {
            self.state.borrow_mut().restore(checkpoint);
            debug!(error = %err, "State rolled back");
            err
        })
    }

    fn enter(&self, operation: &'static str) -> Result<Entered<'_>, VaultError> {
        self.guard.enter().map_err(|err| {
            warn!(vault = %self.address, operation, "Reentrant call rejected");
            err
        })
    }

    fn counterparty(&self, asset: &AssetId) -> Result<&Arc<dyn AssetCounterparty>, VaultError> {
        self.counterparties
            .get(asset)
            .ok_or_else(|| LedgerError::UnsupportedAsset { asset: *asset }.into())
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("address", &self.address)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("guard", &self.guard)
            .field("assets", &self.counterparties.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if !is_positive(amount) {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}

/// A transfer that failed after the guard turned away a nested call is
/// reported as a reentrancy failure, not a generic transfer error.
fn transfer_error(entered: &Entered<'_>, asset: AssetId, amount: Decimal, failure: TransferFailure) -> VaultError {
    let attempts = entered.rejected_attempts();
    warn!(%asset, %amount, attempts, error = %failure, "Transfer failed");
    if attempts > 0 {
        VaultError::ReentrantTransfer { asset, attempts }
    } else {
        LedgerError::TransferFailed {
            asset,
            amount,
            reason: failure.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counterparty::{InMemoryAsset, ReceiveHook};
    use crate::errors::{AccessError, OwnershipError, PauseError};
    use std::sync::Mutex;

    /// Recipient that calls `withdraw` again on every payment, optionally
    /// pausing the vault first, and records what the nested call returned.
    struct Reenter {
        holder: Address,
        amount: Decimal,
        pause_as: Option<Address>,
        nested: Mutex<Vec<Result<Decimal, VaultError>>>,
    }

    impl Reenter {
        fn new(holder: Address, amount: Decimal, pause_as: Option<Address>) -> Self {
            Self {
                holder,
                amount,
                pause_as,
                nested: Mutex::new(Vec::new()),
            }
        }
    }

    impl ReceiveHook for Reenter {
        fn on_receive(&self, vault: &Vault, asset: AssetId, _amount: Decimal) -> Result<(), TransferFailure> {
            if let Some(pauser) = self.pause_as {
                if !vault.paused() {
                    let _ = vault.pause(pauser);
                }
            }
            let result = vault.withdraw(self.holder, self.holder, asset, self.amount);
            self.nested.lock().unwrap().push(result);
            Ok(())
        }
    }

    fn deployer() -> Address {
        Address::from_label("deployer")
    }

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    fn setup() -> (Vault, Arc<InMemoryAsset>) {
        let mut vault = Vault::new(deployer());
        let native = Arc::new(InMemoryAsset::native());
        vault.register_asset(native.clone());
        native.mint(alice(), Decimal::from(100));
        native.mint(bob(), Decimal::from(100));
        (vault, native)
    }

    // --- Construction ---

    #[test]
    fn test_deployer_is_owner_and_admin() {
        let vault = Vault::new(deployer());
        assert_eq!(vault.owner(), deployer());
        assert!(vault.has_role(&RoleId::DEFAULT_ADMIN, &deployer()));
        assert!(!vault.paused());
        assert_eq!(vault.ownership_mode(), OwnershipMode::TwoStep);

        let names: Vec<_> = vault.events().iter().map(|r| r.event.name()).collect();
        assert_eq!(names, vec!["RoleGranted", "OwnershipTransferred"]);
    }

    #[test]
    fn test_config_pausers_granted() {
        let config = VaultConfig::new().with_pauser(alice());
        let vault = Vault::with_config(deployer(), config).unwrap();
        assert!(vault.has_role(&pauser_role(), &alice()));
        assert_eq!(vault.members(&pauser_role()), vec![alice()]);
    }

    #[test]
    fn test_config_zero_pauser_rejected() {
        let config = VaultConfig::new().with_pauser(Address::ZERO);
        assert!(Vault::with_config(deployer(), config).is_err());
    }

    // --- Deposit / Withdraw ---

    #[test]
    fn test_deposit_and_withdraw() {
        let (vault, native) = setup();
        let balance = vault.deposit(alice(), AssetId::Native, Decimal::from(10)).unwrap();
        assert_eq!(balance, Decimal::from(10));
        assert_eq!(vault.custodied(&AssetId::Native), Decimal::from(10));

        let remaining = vault
            .withdraw(alice(), bob(), AssetId::Native, Decimal::from(4))
            .unwrap();
        assert_eq!(remaining, Decimal::from(6));
        assert_eq!(native.balance_of(&bob()), Decimal::from(104));
        assert!(vault.is_solvent(&AssetId::Native));
        assert!(!vault.guard.is_locked());
    }

    #[test]
    fn test_deposit_zero_rejected() {
        let (vault, _) = setup();
        let result = vault.deposit(alice(), AssetId::Native, Decimal::ZERO);
        assert_eq!(
            result,
            Err(VaultError::Ledger(LedgerError::InvalidAmount {
                amount: Decimal::ZERO
            }))
        );
    }

    #[test]
    fn test_deposit_unsupported_asset() {
        let (vault, _) = setup();
        let token = AssetId::Token(Address::from_label("unknown"));
        let result = vault.deposit(alice(), token, Decimal::ONE);
        assert_eq!(
            result,
            Err(VaultError::Ledger(LedgerError::UnsupportedAsset { asset: token }))
        );
    }

    #[test]
    fn test_deposit_pull_failure_rolls_back() {
        let (vault, _) = setup();
        let events_before = vault.events().len();
        let carol = Address::from_label("carol");
        let result = vault.deposit(carol, AssetId::Native, Decimal::from(5));
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::TransferFailed { .. }))
        ));
        assert_eq!(vault.get_balance(&carol, &AssetId::Native), Decimal::ZERO);
        assert_eq!(vault.total_recorded(&AssetId::Native), Decimal::ZERO);
        assert_eq!(vault.events().len(), events_before);
        assert!(!vault.guard.is_locked());
    }

    #[test]
    fn test_withdraw_insufficient_balance() {
        let (vault, _) = setup();
        vault.deposit(alice(), AssetId::Native, Decimal::ONE).unwrap();
        let result = vault.withdraw(alice(), alice(), AssetId::Native, Decimal::from(2));
        assert_eq!(
            result,
            Err(VaultError::Ledger(LedgerError::InsufficientBalance {
                holder: alice(),
                asset: AssetId::Native,
                requested: Decimal::from(2),
                available: Decimal::ONE,
            }))
        );
        assert_eq!(vault.get_balance(&alice(), &AssetId::Native), Decimal::ONE);
    }

    #[test]
    fn test_withdraw_to_zero_rejected() {
        let (vault, _) = setup();
        vault.deposit(alice(), AssetId::Native, Decimal::ONE).unwrap();
        let result = vault.withdraw(alice(), Address::ZERO, AssetId::Native, Decimal::ONE);
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::InvalidRecipient { .. }))
        ));
    }

    #[test]
    fn test_operator_withdraw() {
        let (vault, native) = setup();
        vault.deposit(alice(), AssetId::Native, Decimal::from(10)).unwrap();

        let result = vault.withdraw_from(bob(), alice(), bob(), AssetId::Native, Decimal::ONE);
        assert_eq!(
            result,
            Err(VaultError::Ledger(LedgerError::NotOperator {
                holder: alice(),
                operator: bob(),
            }))
        );

        vault.set_operator(alice(), bob(), true).unwrap();
        assert!(vault.is_operator(&alice(), &bob()));
        vault
            .withdraw_from(bob(), alice(), bob(), AssetId::Native, Decimal::from(3))
            .unwrap();
        assert_eq!(vault.get_balance(&alice(), &AssetId::Native), Decimal::from(7));
        assert_eq!(native.balance_of(&bob()), Decimal::from(103));

        vault.set_operator(alice(), bob(), false).unwrap();
        assert!(vault
            .withdraw_from(bob(), alice(), bob(), AssetId::Native, Decimal::ONE)
            .is_err());
    }

    // --- Pause ---

    #[test]
    fn test_pause_blocks_ledger() {
        let (vault, _) = setup();
        vault.deposit(alice(), AssetId::Native, Decimal::from(5)).unwrap();
        vault.pause(deployer()).unwrap();

        let err = vault.deposit(alice(), AssetId::Native, Decimal::ONE).unwrap_err();
        assert_eq!(err, VaultError::Pause(PauseError::EnforcedPause));
        let err = vault
            .withdraw(alice(), alice(), AssetId::Native, Decimal::ONE)
            .unwrap_err();
        assert_eq!(err, VaultError::Pause(PauseError::EnforcedPause));
        assert!(!vault.guard.is_locked());
    }

    #[test]
    fn test_pause_authority_owner_only() {
        let config = VaultConfig::new()
            .with_pause_authority(PauseAuthority::Owner)
            .with_pauser(alice());
        let vault = Vault::with_config(deployer(), config).unwrap();
        assert_eq!(
            vault.pause(alice()),
            Err(VaultError::Ownership(OwnershipError::Unauthorized {
                account: alice()
            }))
        );
        vault.pause(deployer()).unwrap();
    }

    #[test]
    fn test_pause_authority_role_only() {
        let config = VaultConfig::new().with_pause_authority(PauseAuthority::PauserRole);
        let vault = Vault::with_config(deployer(), config).unwrap();
        assert_eq!(
            vault.pause(deployer()),
            Err(VaultError::Access(AccessError::MissingRole {
                account: deployer(),
                role: pauser_role(),
            }))
        );
        vault.grant_role(deployer(), pauser_role(), deployer()).unwrap();
        vault.pause(deployer()).unwrap();
    }

    #[test]
    fn test_unauthorized_pause_checked_before_state() {
        let vault = Vault::new(deployer());
        vault.pause(deployer()).unwrap();
        // Already paused, but the authorization failure wins
        assert!(matches!(vault.pause(alice()), Err(VaultError::Access(_))));
    }

    // --- Roles / ownership ---

    #[test]
    fn test_grant_is_idempotent() {
        let vault = Vault::new(deployer());
        assert!(vault.grant_role(deployer(), pauser_role(), alice()).unwrap());
        let count = vault.events().len();
        assert!(!vault.grant_role(deployer(), pauser_role(), alice()).unwrap());
        assert_eq!(vault.events().len(), count);
    }

    #[test]
    fn test_two_step_ownership() {
        let vault = Vault::new(deployer());
        vault.transfer_ownership(deployer(), alice()).unwrap();
        assert_eq!(vault.owner(), deployer());
        assert_eq!(vault.pending_owner(), Some(alice()));
        vault.accept_ownership(alice()).unwrap();
        assert_eq!(vault.owner(), alice());
        assert_eq!(vault.pending_owner(), None);
    }

    // --- Surplus ---

    #[test]
    fn test_recover_surplus() {
        let (vault, native) = setup();
        vault.deposit(alice(), AssetId::Native, Decimal::from(5)).unwrap();
        // Sent straight to the vault, never credited
        native.transfer(bob(), vault.address(), Decimal::from(3)).unwrap();

        let err = vault
            .recover_surplus(deployer(), AssetId::Native, deployer())
            .unwrap_err();
        assert_eq!(err, VaultError::Pause(PauseError::ExpectedPause));

        vault.pause(deployer()).unwrap();
        assert!(matches!(
            vault.recover_surplus(alice(), AssetId::Native, alice()),
            Err(VaultError::Ownership(_))
        ));
        let recovered = vault
            .recover_surplus(deployer(), AssetId::Native, deployer())
            .unwrap();
        assert_eq!(recovered, Decimal::from(3));
        assert_eq!(vault.custodied(&AssetId::Native), Decimal::from(5));

        assert_eq!(
            vault.recover_surplus(deployer(), AssetId::Native, deployer()),
            Err(VaultError::Ledger(LedgerError::NoSurplus {
                asset: AssetId::Native
            }))
        );
    }

    // --- Reentrancy ---

    #[test]
    fn test_guarded_withdraw_bounds_loss_to_own_balance() {
        let (vault, native) = setup();
        let attacker = Address::from_label("attacker");
        let victims: Vec<Address> = (0..3).map(|i| Address::from_label(&format!("victim{i}"))).collect();
        for victim in &victims {
            native.mint(*victim, Decimal::from(100));
            vault.deposit(*victim, AssetId::Native, Decimal::from(100)).unwrap();
        }
        native.mint(attacker, Decimal::ONE);
        vault.deposit(attacker, AssetId::Native, Decimal::ONE).unwrap();

        let hook = Arc::new(Reenter::new(attacker, Decimal::ONE, None));
        native.register_hook(attacker, hook.clone());
        vault.withdraw(attacker, attacker, AssetId::Native, Decimal::ONE).unwrap();

        assert_eq!(
            hook.nested.lock().unwrap().as_slice(),
            &[Err(VaultError::Reentrancy)]
        );
        assert_eq!(native.balance_of(&attacker), Decimal::ONE);
        assert_eq!(vault.custodied(&AssetId::Native), Decimal::from(300));
        assert_eq!(vault.total_recorded(&AssetId::Native), Decimal::from(300));
        assert!(vault.is_solvent(&AssetId::Native));
    }

    #[test]
    fn test_reentry_while_paused_reports_pause() {
        let (vault, native) = setup();
        vault.deposit(alice(), AssetId::Native, Decimal::from(10)).unwrap();
        let hook = Arc::new(Reenter::new(alice(), Decimal::ONE, Some(deployer())));
        native.register_hook(alice(), hook.clone());

        vault
            .withdraw(alice(), alice(), AssetId::Native, Decimal::ONE)
            .unwrap();

        // The pause gate answers before the guard is consulted
        assert_eq!(
            hook.nested.lock().unwrap().as_slice(),
            &[Err(VaultError::Pause(PauseError::EnforcedPause))]
        );
        assert!(vault.paused());
        assert_eq!(vault.get_balance(&alice(), &AssetId::Native), Decimal::from(9));
    }

    // --- Events ---

    #[test]
    fn test_rollback_truncates_event_log() {
        let (vault, native) = setup();
        for _ in 0..50 {
            vault.deposit(alice(), AssetId::Native, Decimal::ONE).unwrap();
        }
        let before = vault.events();
        let last_sequence = before.last().map(|r| r.sequence).unwrap();

        // Carol has no funds, so the pull fails after the credit was recorded
        let carol = Address::from_label("carol");
        assert!(vault.deposit(carol, AssetId::Native, Decimal::ONE).is_err());
        assert_eq!(vault.events(), before);

        native.mint(carol, Decimal::ONE);
        vault.deposit(carol, AssetId::Native, Decimal::ONE).unwrap();
        let events = vault.events();
        assert_eq!(events.len(), before.len() + 1);
        assert_eq!(events.last().map(|r| r.sequence), Some(last_sequence + 1));
    }

    #[test]
    fn test_event_sequence_continues_after_drain() {
        let (vault, _) = setup();
        let drained = vault.drain_events();
        assert_eq!(drained.len(), 2);
        assert!(vault.events().is_empty());

        vault.deposit(alice(), AssetId::Native, Decimal::ONE).unwrap();
        let events = vault.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 3);
        assert!(matches!(events[0].event, ContractEvent::Deposit(_)));
    }
}
