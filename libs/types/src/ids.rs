//! Identifier types for custody participants, assets and roles
//!
//! Identities are 20-byte addresses rendered as `0x`-prefixed hex. The all-zero
//! address is the null identity: it never acts as a caller and is the value an
//! owner field takes after renunciation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::IdParseError;

/// Identity of a caller, holder, owner or counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// Length of an address in bytes
    pub const LEN: usize = 20;

    /// The null identity
    pub const ZERO: Address = Address([0u8; 20]);

    /// Generate a fresh address.
    ///
    /// Derived from a UUID v7 so addresses created in one process never collide.
    pub fn new() -> Self {
        Self::derive(Uuid::now_v7().as_bytes())
    }

    /// Deterministic address for a human-readable label (e.g. "deployer").
    pub fn from_label(label: &str) -> Self {
        Self::derive(label.as_bytes())
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// True for the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    fn derive(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }
}

/// The null identity. Use [`Address::new`] for a fresh one.
impl Default for Address {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).map_err(|e| IdParseError::InvalidHex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| IdParseError::InvalidLength {
                expected: Self::LEN,
                actual: v.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Asset class held in custody.
///
/// `Native` is the system's own value; `Token` is a fungible asset identified
/// by the address of its contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetId {
    Native,
    Token(Address),
}

impl AssetId {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetId::Native)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Native => write!(f, "native"),
            AssetId::Token(address) => write!(f, "token:{}", address),
        }
    }
}

/// Identifier of a named capability.
///
/// Named roles hash their name with SHA-256; the all-zero id is the default
/// admin role, which administers every role unless reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId([u8; 32]);

impl RoleId {
    pub const DEFAULT_ADMIN: RoleId = RoleId([0u8; 32]);

    /// Role id for a capability name such as `"PAUSER_ROLE"`.
    pub fn named(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
