//! Role-based access control
//!
//! Each role maps to a set of holders and exactly one admin role. Holding the
//! admin role of `R` is what authorizes granting or revoking `R`. Roles without
//! an explicit admin are administered by [`RoleId::DEFAULT_ADMIN`], which also
//! administers itself.

use custody_types::ids::{Address, RoleId};
use std::collections::{BTreeSet, HashMap};

use crate::errors::AccessError;
use crate::events::{RoleAdminChanged, RoleGranted, RoleRevoked};

/// Capability name of the role allowed to pause and unpause the vault.
pub const PAUSER_ROLE: &str = "PAUSER_ROLE";

/// Role id for [`PAUSER_ROLE`].
pub fn pauser_role() -> RoleId {
    RoleId::named(PAUSER_ROLE)
}

#[derive(Debug, Clone, Default)]
struct RoleData {
    members: BTreeSet<Address>,
    admin_role: Option<RoleId>,
}

/// Role-based access control registry.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<RoleId, RoleData>,
}

impl RoleRegistry {
    /// Create a registry where `default_admin` holds the default admin role.
    pub fn new(default_admin: Address) -> Self {
        let mut registry = Self {
            roles: HashMap::new(),
        };
        registry.insert_member(RoleId::DEFAULT_ADMIN, default_admin);
        registry
    }

    /// Check if an account holds a role.
    pub fn has_role(&self, role: &RoleId, account: &Address) -> bool {
        self.roles
            .get(role)
            .map_or(false, |data| data.members.contains(account))
    }

    /// Fail with `MissingRole` unless `account` holds `role`.
    pub fn check_role(&self, role: &RoleId, account: &Address) -> Result<(), AccessError> {
        if !self.has_role(role, account) {
            return Err(AccessError::MissingRole {
                account: *account,
                role: *role,
            });
        }
        Ok(())
    }

    /// The role whose holders may grant and revoke `role`.
    pub fn role_admin(&self, role: &RoleId) -> RoleId {
        self.roles
            .get(role)
            .and_then(|data| data.admin_role)
            .unwrap_or(RoleId::DEFAULT_ADMIN)
    }

    /// Holders of `role`, in address order.
    pub fn members(&self, role: &RoleId) -> Vec<Address> {
        self.roles
            .get(role)
            .map(|data| data.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Grant `role` to `account`. Caller must hold the role's admin role.
    ///
    /// Returns `None` when the account already held the role.
    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: RoleId,
        account: Address,
    ) -> Result<Option<RoleGranted>, AccessError> {
        self.check_role(&self.role_admin(&role), caller)?;
        Ok(self.grant_unchecked(role, account, *caller))
    }

    /// Revoke `role` from `account`. Caller must hold the role's admin role.
    ///
    /// Returns `None` when the account did not hold the role.
    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: RoleId,
        account: Address,
    ) -> Result<Option<RoleRevoked>, AccessError> {
        self.check_role(&self.role_admin(&role), caller)?;
        Ok(self.remove_member(role, account, *caller))
    }

    /// Drop a role held by the caller itself. `account` must equal `caller`.
    ///
    /// Renouncing a role that is not held is a no-op.
    pub fn renounce_role(
        &mut self,
        caller: &Address,
        role: RoleId,
        account: Address,
    ) -> Result<Option<RoleRevoked>, AccessError> {
        if *caller != account {
            return Err(AccessError::BadConfirmation {
                caller: *caller,
                account,
            });
        }
        Ok(self.remove_member(role, account, *caller))
    }

    /// Reassign the admin role of `role`. Caller must hold the current admin role.
    pub fn set_role_admin(
        &mut self,
        caller: &Address,
        role: RoleId,
        admin_role: RoleId,
    ) -> Result<RoleAdminChanged, AccessError> {
        let previous_admin_role = self.role_admin(&role);
        self.check_role(&previous_admin_role, caller)?;
        self.roles.entry(role).or_default().admin_role = Some(admin_role);
        Ok(RoleAdminChanged {
            role,
            previous_admin_role,
            new_admin_role: admin_role,
        })
    }

    /// Grant without an admin check. Used at construction for initial holders.
    pub(crate) fn grant_unchecked(
        &mut self,
        role: RoleId,
        account: Address,
        sender: Address,
    ) -> Option<RoleGranted> {
        self.insert_member(role, account).then(|| RoleGranted {
            role,
            account,
            sender,
        })
    }

    fn insert_member(&mut self, role: RoleId, account: Address) -> bool {
        self.roles.entry(role).or_default().members.insert(account)
    }

    fn remove_member(&mut self, role: RoleId, account: Address, sender: Address) -> Option<RoleRevoked> {
        let removed = self
            .roles
            .get_mut(&role)
            .map_or(false, |data| data.members.remove(&account));
        removed.then(|| RoleRevoked {
            role,
            account,
            sender,
        })
    }
}
