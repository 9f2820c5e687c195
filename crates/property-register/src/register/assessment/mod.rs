mod leeway;

pub use leeway::{Household, LeewayTable};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::domain::{Owner, PropertyId, PropertyType};
use super::rates::{RateError, RateSnapshot};

/// Stateless calculator turning an owner's properties and household into an obligation.
#[derive(Debug, Clone, Default)]
pub struct TaxAssessor {
    leeway: LeewayTable,
}

impl TaxAssessor {
    pub fn new(leeway: LeewayTable) -> Self {
        Self { leeway }
    }

    /// Obligation for one owner against `rates`. Any property whose type has no rate
    /// fails the whole assessment.
    pub fn assess(&self, owner: &Owner, rates: &RateSnapshot) -> Result<Decimal, RateError> {
        self.breakdown(owner, rates)
            .map(|assessment| assessment.obligation)
    }

    pub fn breakdown(&self, owner: &Owner, rates: &RateSnapshot) -> Result<Assessment, RateError> {
        let charges = owner
            .properties
            .iter()
            .map(|property| {
                let rate = rates.lookup(property.property_type)?;
                Ok(BaseCharge {
                    property_id: property.id,
                    property_type: property.property_type,
                    area: property.area,
                    rate,
                    amount: property.area * rate,
                })
            })
            .collect::<Result<Vec<_>, RateError>>()?;

        let gross: Decimal = charges.iter().map(|charge| charge.amount).sum();
        let leeway_factor = self.leeway.factor(Household::of(owner));
        let obligation = apply_leeway(gross, leeway_factor);

        Ok(Assessment {
            gross,
            leeway_factor,
            obligation,
            charges,
        })
    }
}

fn apply_leeway(gross: Decimal, factor: Decimal) -> Decimal {
    if factor == Decimal::ONE {
        return gross;
    }
    (gross * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Area times rate for a single property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCharge {
    pub property_id: PropertyId,
    pub property_type: PropertyType,
    pub area: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub gross: Decimal,
    pub leeway_factor: Decimal,
    pub obligation: Decimal,
    pub charges: Vec<BaseCharge>,
}
