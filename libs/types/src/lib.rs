//! Types library for the custody primitives
//!
//! Identifier and amount types shared by the contract crate, kept separate so
//! hosts and counterparties can depend on them without pulling in the vault.
//!
//! # Modules
//! - `ids`: Identities (`Address`), asset classes (`AssetId`), roles (`RoleId`)
//! - `numeric`: Decimal amount helpers
//! - `errors`: Error kind taxonomy and id parse errors

pub mod ids;
pub mod numeric;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
