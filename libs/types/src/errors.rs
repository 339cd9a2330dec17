//! Error taxonomy shared by the custody primitives
//!
//! Every contract error maps onto one [`ErrorKind`] so callers can tell a
//! failure worth retrying later from one that will never succeed as submitted.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the required role or ownership
    Authorization,
    /// Operation invalid for the current pause or ownership state
    State,
    /// Invalid target or amount
    Validation,
    /// Withdrawal exceeds the recorded balance
    InsufficientBalance,
    /// External asset movement failed or was rejected
    Transfer,
    /// Guard already held at entry
    Reentrancy,
}

impl ErrorKind {
    /// Whether resubmitting the same call may succeed once state changes
    /// (unpause, guard release, counterparty recovery).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::State | ErrorKind::Transfer | ErrorKind::Reentrancy
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Authorization => "authorization",
            ErrorKind::State => "state",
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientBalance => "insufficient_balance",
            ErrorKind::Transfer => "transfer",
            ErrorKind::Reentrancy => "reentrancy",
        };
        f.write_str(name)
    }
}

/// Failure to parse an identifier from text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdParseError {
    #[error("Invalid hex in {input}: {reason}")]
    InvalidHex { input: String, reason: String },

    #[error("Invalid identifier length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
