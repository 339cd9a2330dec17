//! Amount helpers
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).

use rust_decimal::Decimal;

/// Quantity of an asset. Ledger amounts are never negative.
pub type Amount = Decimal;

/// Whole units of an asset, e.g. `units(5)` for 5.0.
pub fn units(value: u64) -> Amount {
    Decimal::from(value)
}

/// True when the amount is usable for a deposit or withdrawal.
pub fn is_positive(amount: Amount) -> bool {
    amount > Decimal::ZERO
}

/// Checked sum; `None` on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}
