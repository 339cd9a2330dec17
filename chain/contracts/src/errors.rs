//! Contract-specific error types
//!
//! One enum per primitive, wrapped by [`VaultError`] for the composed vault.
//! Each variant maps onto an [`ErrorKind`] from the shared taxonomy.

use custody_types::errors::ErrorKind;
use custody_types::ids::{Address, AssetId, RoleId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Role registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("Account {account} is missing role {role}")]
    MissingRole { account: Address, role: RoleId },

    #[error("Bad confirmation: {caller} can only renounce roles for itself, not {account}")]
    BadConfirmation { caller: Address, account: Address },
}

impl AccessError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Authorization
    }
}

/// Ownership errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OwnershipError {
    #[error("Unauthorized account: {account}")]
    Unauthorized { account: Address },

    #[error("Invalid owner: {owner}")]
    InvalidOwner { owner: Address },

    #[error("Ownership is immediate: there is no pending transfer to accept")]
    TwoStepDisabled,
}

impl OwnershipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OwnershipError::Unauthorized { .. } => ErrorKind::Authorization,
            OwnershipError::InvalidOwner { .. } => ErrorKind::Validation,
            OwnershipError::TwoStepDisabled => ErrorKind::State,
        }
    }
}

/// Pause gate errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PauseError {
    #[error("Enforced pause: operation disabled while paused")]
    EnforcedPause,

    #[error("Expected pause: operation requires paused state")]
    ExpectedPause,

    #[error("Already paused")]
    AlreadyPaused,

    #[error("Not paused")]
    NotPaused,
}

impl PauseError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::State
    }
}

/// Balance ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Asset not supported: {asset}")]
    UnsupportedAsset { asset: AssetId },

    #[error("Invalid recipient: {recipient}")]
    InvalidRecipient { recipient: Address },

    #[error("Insufficient balance for {holder} in {asset}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Address,
        asset: AssetId,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Arithmetic overflow in {asset} balance calculation")]
    Overflow { asset: AssetId },

    #[error("{operator} is not an approved operator for {holder}")]
    NotOperator { holder: Address, operator: Address },

    #[error("Transfer of {amount} {asset} failed: {reason}")]
    TransferFailed {
        asset: AssetId,
        amount: Decimal,
        reason: String,
    },

    #[error("No surplus to recover for {asset}")]
    NoSurplus { asset: AssetId },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. }
            | LedgerError::UnsupportedAsset { .. }
            | LedgerError::InvalidRecipient { .. }
            | LedgerError::Overflow { .. }
            | LedgerError::NoSurplus { .. } => ErrorKind::Validation,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::NotOperator { .. } => ErrorKind::Authorization,
            LedgerError::TransferFailed { .. } => ErrorKind::Transfer,
        }
    }
}

/// Errors surfaced by [`crate::vault::Vault`] operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaultError {
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    #[error("Pause error: {0}")]
    Pause(#[from] PauseError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Reentrant call rejected")]
    Reentrancy,

    #[error("Transfer of {asset} aborted: {attempts} reentrant call(s) rejected during the transfer")]
    ReentrantTransfer { asset: AssetId, attempts: u32 },
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Access(e) => e.kind(),
            VaultError::Ownership(e) => e.kind(),
            VaultError::Pause(e) => e.kind(),
            VaultError::Ledger(e) => e.kind(),
            VaultError::Reentrancy | VaultError::ReentrantTransfer { .. } => {
                ErrorKind::Reentrancy
            }
        }
    }

    /// Shorthand for `self.kind().is_transient()`.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}
