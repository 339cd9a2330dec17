//! Balance book for custodied assets
//!
//! Balances are keyed by holder, then asset. A running total per asset is kept
//! alongside so solvency checks do not walk every holder. Entries stay at zero
//! after a full withdrawal instead of being removed.

use custody_types::ids::{Address, AssetId};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::LedgerError;

#[derive(Debug, Clone, Default)]
pub struct AssetLedger {
    /// Balances: holder -> (asset -> amount)
    balances: HashMap<Address, HashMap<AssetId, Decimal>>,
    /// Sum of all holder balances per asset
    totals: HashMap<AssetId, Decimal>,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get balance for a specific holder and asset.
    pub fn balance(&self, holder: &Address, asset: &AssetId) -> Decimal {
        self.balances
            .get(holder)
            .and_then(|assets| assets.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Get all balances for a holder.
    pub fn holder_balances(&self, holder: &Address) -> Option<&HashMap<AssetId, Decimal>> {
        self.balances.get(holder)
    }

    /// Sum of recorded balances for an asset.
    pub fn total(&self, asset: &AssetId) -> Decimal {
        self.totals.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Add `amount` to a balance with overflow protection. Returns the new balance.
    pub fn credit(
        &mut self,
        holder: Address,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let total = self
            .total(&asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { asset })?;
        let current = self.balance(&holder, &asset);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { asset })?;

        self.write(holder, asset, updated);
        self.totals.insert(asset, total);
        Ok(updated)
    }

    /// Subtract `amount` from a balance. Returns the remaining balance.
    pub fn debit(
        &mut self,
        holder: Address,
        asset: AssetId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let available = self.balance(&holder, &asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                holder,
                asset,
                requested: amount,
                available,
            });
        }
        let updated = available - amount;
        self.write(holder, asset, updated);
        let total = self.total(&asset) - amount;
        self.totals.insert(asset, total);
        Ok(updated)
    }

    /// Overwrite a balance, adjusting the asset total by the difference.
    ///
    /// Blind writes skip the sufficiency check; only the unguarded baseline
    /// withdrawal uses this.
    #[cfg(any(test, feature = "unguarded-baseline"))]
    pub(crate) fn overwrite(&mut self, holder: Address, asset: AssetId, amount: Decimal) {
        let previous = self.balance(&holder, &asset);
        self.write(holder, asset, amount);
        let total = self.total(&asset) - previous + amount;
        self.totals.insert(asset, total);
    }

    fn write(&mut self, holder: Address, asset: AssetId, amount: Decimal) {
        self.balances
            .entry(holder)
            .or_default()
            .insert(asset, amount);
    }
}
