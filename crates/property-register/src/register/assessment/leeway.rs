use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{FamilyStatus, Owner};

/// Household profile used to select a leeway factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Household {
    pub family_status: FamilyStatus,
    pub has_children: bool,
}

impl Household {
    pub fn of(owner: &Owner) -> Self {
        Self {
            family_status: owner.family_status,
            has_children: owner.has_children,
        }
    }
}

/// Share of the gross obligation an owner keeps paying, per household profile.
///
/// The married-with-children factor is its own entry and is not derived from the
/// married and children factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeewayTable {
    pub single: Decimal,
    pub married: Decimal,
    pub with_children: Decimal,
    pub married_with_children: Decimal,
}

impl LeewayTable {
    pub fn factor(&self, household: Household) -> Decimal {
        match (household.family_status, household.has_children) {
            (FamilyStatus::Single, false) => self.single,
            (FamilyStatus::Married, false) => self.married,
            (FamilyStatus::Single, true) => self.with_children,
            (FamilyStatus::Married, true) => self.married_with_children,
        }
    }
}

impl Default for LeewayTable {
    fn default() -> Self {
        Self {
            single: Decimal::ONE,
            married: Decimal::new(9, 1),
            with_children: Decimal::new(7, 1),
            married_with_children: Decimal::new(8, 1),
        }
    }
}
