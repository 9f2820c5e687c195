use rust_decimal::Decimal;

use super::domain::{
    NewOwner, NewProperty, Owner, OwnerId, OwnerUpdate, Property, PropertyId, PropertyUpdate,
};

/// Storage abstraction for the owner population and the properties each owner holds.
///
/// `taxes_debt` is written only through [`OwnerRepository::swap_debt`]; `update` only
/// touches personal, household and contact fields.
pub trait OwnerRepository: Send + Sync {
    fn find_all(&self) -> Result<Vec<Owner>, RepositoryError>;
    fn find_by_id(&self, id: OwnerId) -> Result<Owner, RepositoryError>;
    /// Persists a new owner, assigning fresh owner and property ids.
    fn save(&self, owner: NewOwner) -> Result<Owner, RepositoryError>;
    /// Applies `update` to the stored owner in place. Returns false when the owner is
    /// absent.
    fn update(&self, id: OwnerId, update: OwnerUpdate) -> Result<bool, RepositoryError>;
    fn remove(&self, id: OwnerId) -> Result<bool, RepositoryError>;
    fn clear(&self) -> Result<(), RepositoryError>;

    /// Sets the owner's debt to `updated` only if it still equals `expected`.
    /// Returns false when another writer got there first.
    fn swap_debt(
        &self,
        id: OwnerId,
        expected: Decimal,
        updated: Decimal,
    ) -> Result<bool, RepositoryError>;

    fn save_property(
        &self,
        owner_id: OwnerId,
        property: NewProperty,
    ) -> Result<Property, RepositoryError>;
    fn update_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
        update: &PropertyUpdate,
    ) -> Result<bool, RepositoryError>;
    fn remove_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
    ) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("owner with id: {0} does not exist")]
    NoSuchOwner(OwnerId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound message transport. Delivery is at-least-once and unordered across topics.
pub trait MessageChannel: Send + Sync {
    fn publish(&self, topic: &str, payload: String) -> Result<(), ChannelError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("message channel unavailable: {0}")]
    Transport(String),
}
