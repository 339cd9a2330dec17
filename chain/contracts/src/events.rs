//! Contract events
//!
//! Events are immutable records emitted by successful operations. A call that
//! fails rolls back the events it emitted along with its state changes.

use chrono::{DateTime, Utc};
use custody_types::ids::{Address, AssetId, RoleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value credited to a holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub holder: Address,
    pub asset: AssetId,
    pub amount: Decimal,
}

/// Value debited from a holder and pushed to a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub holder: Address,
    pub asset: AssetId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGranted {
    pub role: RoleId,
    pub account: Address,
    pub sender: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRevoked {
    pub role: RoleId,
    pub account: Address,
    pub sender: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAdminChanged {
    pub role: RoleId,
    pub previous_admin_role: RoleId,
    pub new_admin_role: RoleId,
}

/// Two-step transfer staged; `new_owner` is the null identity on cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferStarted {
    pub previous_owner: Address,
    pub new_owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorUpdated {
    pub holder: Address,
    pub operator: Address,
    pub approved: bool,
}

/// Unrecorded custodied value swept out during maintenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurplusRecovered {
    pub asset: AssetId,
    pub to: Address,
    pub amount: Decimal,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
    Paused { account: Address },
    Unpaused { account: Address },
    RoleGranted(RoleGranted),
    RoleRevoked(RoleRevoked),
    RoleAdminChanged(RoleAdminChanged),
    OwnershipTransferStarted(OwnershipTransferStarted),
    OwnershipTransferred(OwnershipTransferred),
    OperatorUpdated(OperatorUpdated),
    SurplusRecovered(SurplusRecovered),
}

impl ContractEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::Deposit(_) => "Deposit",
            ContractEvent::Withdraw(_) => "Withdraw",
            ContractEvent::Paused { .. } => "Paused",
            ContractEvent::Unpaused { .. } => "Unpaused",
            ContractEvent::RoleGranted(_) => "RoleGranted",
            ContractEvent::RoleRevoked(_) => "RoleRevoked",
            ContractEvent::RoleAdminChanged(_) => "RoleAdminChanged",
            ContractEvent::OwnershipTransferStarted(_) => "OwnershipTransferStarted",
            ContractEvent::OwnershipTransferred(_) => "OwnershipTransferred",
            ContractEvent::OperatorUpdated(_) => "OperatorUpdated",
            ContractEvent::SurplusRecovered(_) => "SurplusRecovered",
        }
    }
}

/// An event as stored in the vault's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 1
    pub sequence: u64,
    pub event_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub event: ContractEvent,
}

impl EventRecord {
    pub fn new(sequence: u64, event: ContractEvent) -> Self {
        Self {
            sequence,
            event_id: Uuid::now_v7(),
            recorded_at: Utc::now(),
            event,
        }
    }
}
