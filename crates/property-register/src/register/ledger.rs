use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::Owner;

/// Scale of every stored debt balance.
pub const DEBT_SCALE: u32 = 2;

/// Owns the arithmetic on `taxes_debt`. Balances only grow here; payments are handled
/// elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebtLedger;

impl DebtLedger {
    /// Adds `obligation` to the owner's balance. Calling this twice for the same
    /// owner charges twice.
    pub fn accumulate(&self, mut owner: Owner, obligation: Decimal) -> Owner {
        owner.taxes_debt = self.add(owner.taxes_debt, obligation);
        owner
    }

    /// Balance after charging `obligation` on top of `debt`.
    pub fn add(&self, debt: Decimal, obligation: Decimal) -> Decimal {
        normalize(debt + obligation.max(Decimal::ZERO))
    }

    /// Adds `percent` of the current balance to a debtor's balance. Non-debtors are
    /// returned unchanged.
    pub fn accrue_surcharge(&self, mut owner: Owner, percent: Decimal) -> Owner {
        if self.is_debtor(&owner) {
            owner.taxes_debt = self.surcharged(owner.taxes_debt, percent);
        }
        owner
    }

    pub fn surcharged(&self, debt: Decimal, percent: Decimal) -> Decimal {
        if debt <= Decimal::ZERO {
            return debt;
        }
        let surcharge = debt * percent.max(Decimal::ZERO) / Decimal::ONE_HUNDRED;
        normalize(debt + surcharge)
    }

    pub fn is_debtor(&self, owner: &Owner) -> bool {
        owner.taxes_debt > Decimal::ZERO
    }
}

/// Rounds half-up to two places and pins the scale, so 10500 renders as "10500.00".
pub fn normalize(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(DEBT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DEBT_SCALE);
    rounded
}
