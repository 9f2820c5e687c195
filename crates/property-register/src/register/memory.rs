use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;

use super::domain::{
    NewOwner, NewProperty, Owner, OwnerId, OwnerUpdate, Property, PropertyId, PropertyUpdate,
};
use super::repository::{OwnerRepository, RepositoryError};

/// Monotonic id source owned by storage. Callers never pick ids for new records.
#[derive(Debug)]
pub struct IdSequence {
    owners: AtomicU64,
    properties: AtomicU64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self {
            owners: AtomicU64::new(1),
            properties: AtomicU64::new(1),
        }
    }

    pub fn next_owner_id(&self) -> OwnerId {
        OwnerId(self.owners.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_property_id(&self) -> PropertyId {
        PropertyId(self.properties.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-local owner store. A single mutex serialises every write.
#[derive(Debug, Default)]
pub struct InMemoryOwnerRepository {
    owners: Mutex<BTreeMap<OwnerId, Owner>>,
    sequence: IdSequence,
}

impl InMemoryOwnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<OwnerId, Owner>>, RepositoryError> {
        self.owners
            .lock()
            .map_err(|_| RepositoryError::Unavailable("owner store lock poisoned".to_string()))
    }
}

impl OwnerRepository for InMemoryOwnerRepository {
    fn find_all(&self) -> Result<Vec<Owner>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn find_by_id(&self, id: OwnerId) -> Result<Owner, RepositoryError> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NoSuchOwner(id))
    }

    fn save(&self, owner: NewOwner) -> Result<Owner, RepositoryError> {
        let id = self.sequence.next_owner_id();
        let properties = owner
            .properties
            .into_iter()
            .map(|property| property.into_property(self.sequence.next_property_id()))
            .collect();
        let stored = Owner {
            id,
            first_name: owner.first_name,
            last_name: owner.last_name,
            age: owner.age,
            family_status: owner.family_status,
            has_children: owner.has_children,
            email: owner.email,
            phone_number: owner.phone_number,
            birthday: owner.birthday,
            taxes_debt: owner.taxes_debt,
            properties,
        };
        self.lock()?.insert(id, stored.clone());
        Ok(stored)
    }

    fn update(&self, id: OwnerId, update: OwnerUpdate) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&id) {
            Some(current) => {
                update.apply_to(current);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, id: OwnerId) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.lock()?.clear();
        Ok(())
    }

    fn swap_debt(
        &self,
        id: OwnerId,
        expected: Decimal,
        updated: Decimal,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        let owner = guard.get_mut(&id).ok_or(RepositoryError::NoSuchOwner(id))?;
        if owner.taxes_debt != expected {
            return Ok(false);
        }
        owner.taxes_debt = updated;
        Ok(true)
    }

    fn save_property(
        &self,
        owner_id: OwnerId,
        property: NewProperty,
    ) -> Result<Property, RepositoryError> {
        let mut guard = self.lock()?;
        let owner = guard
            .get_mut(&owner_id)
            .ok_or(RepositoryError::NoSuchOwner(owner_id))?;
        let stored = property.into_property(self.sequence.next_property_id());
        owner.properties.push(stored.clone());
        Ok(stored)
    }

    fn update_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
        update: &PropertyUpdate,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        let Some(owner) = guard.get_mut(&owner_id) else {
            return Ok(false);
        };
        match owner
            .properties
            .iter_mut()
            .find(|property| property.id == property_id)
        {
            Some(property) => {
                update.apply_to(property);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.lock()?;
        let Some(owner) = guard.get_mut(&owner_id) else {
            return Ok(false);
        };
        let before = owner.properties.len();
        owner.properties.retain(|property| property.id != property_id);
        Ok(owner.properties.len() != before)
    }
}
