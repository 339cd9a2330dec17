//! Custody safety primitives
//!
//! Composable building blocks for a service that holds value on behalf of
//! others, and a [`vault::Vault`] that wires them together.
//!
//! # Modules
//! - `access`: Role registry with per-role admin roles
//! - `ownable`: Single-owner authorization, immediate or two-step transfer
//! - `pausable`: Active/Paused lifecycle gate
//! - `security`: Reentrancy guard with scoped release
//! - `ledger`: Per-holder, per-asset balance book
//! - `counterparty`: Untrusted asset contracts and an in-memory implementation
//! - `vault`: Deposits, withdrawals and administration behind one entry point
//! - `config`: Vault construction options
//! - `events`: Events emitted by successful operations
//! - `errors`: Contract-specific error types

pub mod access;
pub mod config;
pub mod counterparty;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod ownable;
pub mod pausable;
pub mod security;
pub mod vault;

pub use config::{OwnershipMode, PauseAuthority, VaultConfig};
pub use counterparty::{AssetCounterparty, InMemoryAsset, ReceiveHook, TransferFailure};
pub use errors::VaultError;
pub use vault::Vault;
