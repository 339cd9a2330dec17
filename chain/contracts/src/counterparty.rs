//! External asset contracts the vault moves value through
//!
//! The vault trusts nothing about a counterparty beyond the trait contract:
//! a transfer may fail, and a recipient may run arbitrary code (including
//! calls back into the vault) before the transfer returns.
//!
//! [`InMemoryAsset`] models both native value and a wrapped token. Recipients
//! can register a [`ReceiveHook`] that runs during `transfer_out`; a failing
//! hook reverts the transfer on the asset's own books.

use custody_types::ids::{Address, AssetId};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;

use crate::vault::Vault;

/// Why a counterparty refused or reverted a transfer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferFailure {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("insufficient allowance: requested {requested}, allowed {allowed}")]
    InsufficientAllowance { requested: Decimal, allowed: Decimal },

    #[error("rejected by recipient: {reason}")]
    Rejected { reason: String },
}

/// The untrusted asset contract behind one [`AssetId`].
pub trait AssetCounterparty: Send + Sync {
    /// The asset this counterparty moves.
    fn asset(&self) -> AssetId;

    /// Pull `amount` from `from` into the vault's custody.
    fn transfer_in(&self, vault: &Vault, from: Address, amount: Decimal)
        -> Result<(), TransferFailure>;

    /// Push `amount` out of the vault's custody to `to`. May call back into
    /// `vault` before returning.
    fn transfer_out(&self, vault: &Vault, to: Address, amount: Decimal)
        -> Result<(), TransferFailure>;

    /// Value currently held by `holder`.
    fn balance_of(&self, holder: &Address) -> Decimal;
}

/// Code a recipient runs when it receives value.
pub trait ReceiveHook: Send + Sync {
    fn on_receive(
        &self,
        vault: &Vault,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<(), TransferFailure>;
}

/// In-memory asset contract.
///
/// Native value needs no approval to be pulled; wrapped tokens require the
/// holder to approve the vault first, as with a WETH-style contract.
pub struct InMemoryAsset {
    asset: AssetId,
    requires_allowance: bool,
    balances: Mutex<HashMap<Address, Decimal>>,
    /// (owner, spender) -> remaining allowance
    allowances: Mutex<HashMap<(Address, Address), Decimal>>,
    hooks: Mutex<HashMap<Address, Arc<dyn ReceiveHook>>>,
}

impl InMemoryAsset {
    /// Native value: pulls need no allowance.
    pub fn native() -> Self {
        Self::with_asset(AssetId::Native, false)
    }

    /// Wrapped token living at `contract`: pulls consume an allowance.
    pub fn token(contract: Address) -> Self {
        Self::with_asset(AssetId::Token(contract), true)
    }

    fn with_asset(asset: AssetId, requires_allowance: bool) -> Self {
        Self {
            asset,
            requires_allowance,
            balances: Mutex::new(HashMap::new()),
            allowances: Mutex::new(HashMap::new()),
            hooks: Mutex::new(HashMap::new()),
        }
    }

    /// Create `amount` out of thin air for `holder`.
    pub fn mint(&self, holder: Address, amount: Decimal) {
        let mut balances = lock(&self.balances);
        *balances.entry(holder).or_insert(Decimal::ZERO) += amount;
    }

    /// Allow `spender` to pull up to `amount` from `owner`.
    pub fn approve(&self, owner: Address, spender: Address, amount: Decimal) {
        lock(&self.allowances).insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Decimal {
        lock(&self.allowances)
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Direct transfer between two holders. Runs no hook.
    pub fn transfer(&self, from: Address, to: Address, amount: Decimal) -> Result<(), TransferFailure> {
        move_funds(&mut lock(&self.balances), from, to, amount)
    }

    /// Run `hook` whenever `holder` receives value through `transfer_out`.
    pub fn register_hook(&self, holder: Address, hook: Arc<dyn ReceiveHook>) {
        lock(&self.hooks).insert(holder, hook);
    }

    pub fn remove_hook(&self, holder: &Address) {
        lock(&self.hooks).remove(holder);
    }
}

impl AssetCounterparty for InMemoryAsset {
    fn asset(&self) -> AssetId {
        self.asset
    }

    fn transfer_in(&self, vault: &Vault, from: Address, amount: Decimal) -> Result<(), TransferFailure> {
        let spender = vault.address();
        let mut allowances = lock(&self.allowances);
        let mut balances = lock(&self.balances);

        if self.requires_allowance {
            let allowed = allowances
                .get(&(from, spender))
                .copied()
                .unwrap_or(Decimal::ZERO);
            if allowed < amount {
                return Err(TransferFailure::InsufficientAllowance {
                    requested: amount,
                    allowed,
                });
            }
            move_funds(&mut balances, from, spender, amount)?;
            allowances.insert((from, spender), allowed - amount);
        } else {
            move_funds(&mut balances, from, spender, amount)?;
        }

        debug!(asset = %self.asset, %from, %amount, "Pulled into custody");
        Ok(())
    }

    fn transfer_out(&self, vault: &Vault, to: Address, amount: Decimal) -> Result<(), TransferFailure> {
        let snapshot = {
            let mut balances = lock(&self.balances);
            let snapshot = balances.clone();
            move_funds(&mut balances, vault.address(), to, amount)?;
            snapshot
        };

        // Locks are released here so the hook can call back into the vault,
        // and through it into this asset.
        let hook = lock(&self.hooks).get(&to).cloned();
        if let Some(hook) = hook {
            if let Err(failure) = hook.on_receive(vault, self.asset, amount) {
                debug!(asset = %self.asset, %to, error = %failure, "Recipient hook failed, reverting");
                *lock(&self.balances) = snapshot;
                return Err(failure);
            }
        }

        debug!(asset = %self.asset, %to, %amount, "Pushed out of custody");
        Ok(())
    }

    fn balance_of(&self, holder: &Address) -> Decimal {
        lock(&self.balances)
            .get(holder)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl std::fmt::Debug for InMemoryAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAsset")
            .field("asset", &self.asset)
            .field("requires_allowance", &self.requires_allowance)
            .field("holders", &lock(&self.balances).len())
            .finish()
    }
}

fn move_funds(
    balances: &mut HashMap<Address, Decimal>,
    from: Address,
    to: Address,
    amount: Decimal,
) -> Result<(), TransferFailure> {
    let available = balances.get(&from).copied().unwrap_or(Decimal::ZERO);
    if available < amount {
        return Err(TransferFailure::InsufficientFunds {
            requested: amount,
            available,
        });
    }
    balances.insert(from, available - amount);
    *balances.entry(to).or_insert(Decimal::ZERO) += amount;
    Ok(())
}

/// A panicking hook must not wedge the asset for everyone else.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
