use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use super::assessment::{Assessment, TaxAssessor};
use super::directory::OwnerDirectory;
use super::domain::{
    NewOwner, NewProperty, Owner, OwnerId, OwnerUpdate, Property, PropertyId, PropertyUpdate,
};
use super::rates::{RateError, TaxRateTable};
use super::repository::{OwnerRepository, RepositoryError};

/// Owner and property management plus on-demand obligation queries.
pub struct OwnerService<R> {
    repository: Arc<R>,
    directory: OwnerDirectory<R>,
    rates: Arc<TaxRateTable>,
    assessor: TaxAssessor,
}

impl<R> OwnerService<R>
where
    R: OwnerRepository + 'static,
{
    pub fn new(repository: Arc<R>, rates: Arc<TaxRateTable>, assessor: TaxAssessor) -> Self {
        let directory = OwnerDirectory::new(Arc::clone(&repository));
        Self {
            repository,
            directory,
            rates,
            assessor,
        }
    }

    pub fn all_owners(&self) -> Result<Vec<Owner>, OwnerServiceError> {
        Ok(self.directory.find_all()?)
    }

    pub fn owner_by_id(&self, id: OwnerId) -> Result<Owner, OwnerServiceError> {
        Ok(self.directory.find_by_id(id)?)
    }

    pub fn find_debtors(&self) -> Result<Vec<Owner>, OwnerServiceError> {
        Ok(self.directory.find_debtors()?)
    }

    pub fn add_owner(&self, owner: NewOwner) -> Result<Owner, OwnerServiceError> {
        validate_owner(&owner)?;
        let stored = self.repository.save(owner)?;
        info!(owner_id = %stored.id, properties = stored.properties.len(), "owner registered");
        Ok(stored)
    }

    /// Replaces personal, household and contact details. Debt and properties are kept.
    pub fn update_info(&self, id: OwnerId, update: OwnerUpdate) -> Result<Owner, OwnerServiceError> {
        if !self.repository.update(id, update)? {
            return Err(OwnerServiceError::UpdateFailed(format!(
                "owner with id: {id} does not exist"
            )));
        }
        Ok(self.repository.find_by_id(id)?)
    }

    pub fn remove_owner(&self, id: OwnerId) -> Result<bool, OwnerServiceError> {
        Ok(self.repository.remove(id)?)
    }

    /// Obligation the owner would be charged by a recount run against the current rates.
    pub fn count_tax_obligation(&self, id: OwnerId) -> Result<Decimal, OwnerServiceError> {
        Ok(self.tax_assessment(id)?.obligation)
    }

    pub fn tax_assessment(&self, id: OwnerId) -> Result<Assessment, OwnerServiceError> {
        let owner = self.repository.find_by_id(id)?;
        let snapshot = self.rates.snapshot();
        Ok(self.assessor.breakdown(&owner, &snapshot)?)
    }

    pub fn properties(&self, owner_id: OwnerId) -> Result<Vec<Property>, OwnerServiceError> {
        Ok(self.repository.find_by_id(owner_id)?.properties)
    }

    pub fn add_property(
        &self,
        owner_id: OwnerId,
        property: NewProperty,
    ) -> Result<Property, OwnerServiceError> {
        validate_property(&property)?;
        let stored = self.repository.save_property(owner_id, property)?;
        info!(owner_id = %owner_id, property_id = %stored.id, "property registered");
        Ok(stored)
    }

    pub fn update_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
        update: PropertyUpdate,
    ) -> Result<(), OwnerServiceError> {
        if update.area.is_some_and(|area| area <= Decimal::ZERO) {
            return Err(OwnerServiceError::Validation("area must be positive".to_string()));
        }
        if update.number_of_rooms == Some(0) {
            return Err(OwnerServiceError::Validation(
                "number of rooms must be positive".to_string(),
            ));
        }
        if self
            .repository
            .update_property(owner_id, property_id, &update)?
        {
            Ok(())
        } else {
            Err(OwnerServiceError::UpdateFailed(format!(
                "property {property_id} of owner {owner_id} does not exist"
            )))
        }
    }

    pub fn remove_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
    ) -> Result<bool, OwnerServiceError> {
        Ok(self.repository.remove_property(owner_id, property_id)?)
    }
}

fn validate_owner(owner: &NewOwner) -> Result<(), OwnerServiceError> {
    if owner.taxes_debt < Decimal::ZERO {
        return Err(OwnerServiceError::Validation(
            "taxes debt cannot be negative".to_string(),
        ));
    }
    owner.properties.iter().try_for_each(validate_property)
}

fn validate_property(property: &NewProperty) -> Result<(), OwnerServiceError> {
    if property.area <= Decimal::ZERO {
        return Err(OwnerServiceError::Validation("area must be positive".to_string()));
    }
    if property.number_of_rooms == 0 {
        return Err(OwnerServiceError::Validation(
            "number of rooms must be positive".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum OwnerServiceError {
    #[error("update failed: {0}")]
    UpdateFailed(String),
    #[error("invalid owner data: {0}")]
    Validation(String),
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
