use std::sync::Arc;

use arc_swap::ArcSwap;
use rust_decimal::Decimal;
use tracing::info;

use super::domain::{PropertyType, TaxRate};

/// Immutable view of the active rate set. A recount cycle holds one of these for its
/// whole pass so concurrent rate changes are never observed mid-cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSnapshot {
    rates: Vec<TaxRate>,
}

impl RateSnapshot {
    pub fn new(rates: Vec<TaxRate>) -> Self {
        Self { rates }
    }

    pub fn lookup(&self, property_type: PropertyType) -> Result<Decimal, RateError> {
        self.rates
            .iter()
            .find(|rate| rate.property_type == property_type)
            .map(|rate| rate.tax)
            .ok_or(RateError::RateNotFound(property_type))
    }

    pub fn rates(&self) -> &[TaxRate] {
        &self.rates
    }

    fn contains(&self, property_type: PropertyType) -> bool {
        self.rates
            .iter()
            .any(|rate| rate.property_type == property_type)
    }

    fn with_rate(&self, property_type: PropertyType, tax: Decimal) -> Self {
        let rates = self
            .rates
            .iter()
            .map(|rate| {
                if rate.property_type == property_type {
                    TaxRate {
                        tax,
                        ..rate.clone()
                    }
                } else {
                    rate.clone()
                }
            })
            .collect();
        Self { rates }
    }
}

/// Current tax rate per property type, swapped atomically on change.
#[derive(Debug)]
pub struct TaxRateTable {
    active: ArcSwap<RateSnapshot>,
}

impl TaxRateTable {
    /// Builds a table from seed rates. Later duplicates of a type are dropped so the
    /// table holds at most one rate per type.
    pub fn new(seed: Vec<TaxRate>) -> Self {
        let mut rates: Vec<TaxRate> = Vec::with_capacity(seed.len());
        for rate in seed {
            if rates
                .iter()
                .all(|existing| existing.property_type != rate.property_type)
            {
                rates.push(rate);
            }
        }
        Self {
            active: ArcSwap::from_pointee(RateSnapshot::new(rates)),
        }
    }

    /// Rates the register starts with: FLAT 6, HOUSE 8, OFFICE 13.
    pub fn seeded() -> Self {
        Self::new(default_rates())
    }

    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.active.load_full()
    }

    /// All rates in seed order.
    pub fn get_all(&self) -> Vec<TaxRate> {
        self.active.load().rates().to_vec()
    }

    pub fn lookup(&self, property_type: PropertyType) -> Result<Decimal, RateError> {
        self.active.load().lookup(property_type)
    }

    /// Replaces the rate for `property_type`. Returns false without touching the table
    /// when no entry exists for that type.
    pub fn change_tax(&self, property_type: PropertyType, tax: Decimal) -> bool {
        // types are never removed, so a miss here stays a miss
        if !self.active.load().contains(property_type) {
            return false;
        }

        let previous = self
            .active
            .rcu(|current| current.with_rate(property_type, tax));
        let old = previous.lookup(property_type).ok();
        info!(property_type = property_type.label(), ?old, new = %tax, "tax rate changed");
        true
    }
}

impl Default for TaxRateTable {
    fn default() -> Self {
        Self::seeded()
    }
}

pub fn default_rates() -> Vec<TaxRate> {
    vec![
        TaxRate {
            id: 1,
            property_type: PropertyType::Flat,
            tax: Decimal::from(6),
        },
        TaxRate {
            id: 2,
            property_type: PropertyType::House,
            tax: Decimal::from(8),
        },
        TaxRate {
            id: 3,
            property_type: PropertyType::Office,
            tax: Decimal::from(13),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("no tax rate configured for property type {}", .0.label())]
    RateNotFound(PropertyType),
}
