use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::RegisterConfig;
use crate::register::domain::{
    FamilyStatus, NewOwner, NewProperty, Owner, OwnerId, OwnerUpdate, PropertyCondition,
    PropertyId, PropertyType, PropertyUpdate,
};
use crate::register::memory::InMemoryOwnerRepository;
use crate::register::repository::{
    ChannelError, MessageChannel, OwnerRepository, RepositoryError,
};
use crate::register::{PropertyRegister, TaxRateTable};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid decimal")
}

pub(super) fn property(property_type: PropertyType, area: u32) -> NewProperty {
    NewProperty {
        property_type,
        city: "Prague".to_string(),
        address: "Heroev Street 24".to_string(),
        area: Decimal::from(area),
        number_of_rooms: 3,
        cost: Decimal::from(500_000),
        date_of_building: date(2020, 4, 10),
        date_of_becoming_owner: date(2012, 1, 9),
        condition: PropertyCondition::Good,
    }
}

pub(super) fn flat() -> NewProperty {
    property(PropertyType::Flat, 70)
}

pub(super) fn house() -> NewProperty {
    property(PropertyType::House, 150)
}

pub(super) fn large_house() -> NewProperty {
    property(PropertyType::House, 300)
}

pub(super) fn office() -> NewProperty {
    property(PropertyType::Office, 300)
}

pub(super) fn new_owner(
    first_name: &str,
    family_status: FamilyStatus,
    has_children: bool,
    taxes_debt: &str,
    properties: Vec<NewProperty>,
) -> NewOwner {
    NewOwner {
        first_name: first_name.to_string(),
        last_name: "Smith".to_string(),
        age: 30,
        family_status,
        has_children,
        email: format!("{}@example.com", first_name.to_ascii_lowercase()),
        phone_number: "+456987123".to_string(),
        birthday: date(1994, 8, 9),
        taxes_debt: dec(taxes_debt),
        properties,
    }
}

/// Builds an in-memory owner record without going through storage.
pub(super) fn owner(
    family_status: FamilyStatus,
    has_children: bool,
    properties: Vec<NewProperty>,
) -> Owner {
    Owner {
        id: OwnerId(1),
        first_name: "John".to_string(),
        last_name: "Smith".to_string(),
        age: 30,
        family_status,
        has_children,
        email: "johnsmith@gmail.com".to_string(),
        phone_number: "+456987123".to_string(),
        birthday: date(1994, 8, 9),
        taxes_debt: Decimal::ZERO,
        properties: properties
            .into_iter()
            .enumerate()
            .map(|(index, property)| property.into_property(PropertyId(index as u64 + 1)))
            .collect(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryChannel {
    messages: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryChannel {
    pub(super) fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().expect("channel mutex poisoned").clone()
    }
}

impl MessageChannel for MemoryChannel {
    fn publish(&self, topic: &str, payload: String) -> Result<(), ChannelError> {
        self.messages
            .lock()
            .expect("channel mutex poisoned")
            .push((topic.to_string(), payload));
        Ok(())
    }
}

/// Refuses every message whose payload mentions `rejected_email`.
pub(super) struct SelectiveChannel {
    pub(super) rejected_email: String,
    pub(super) inner: MemoryChannel,
}

impl MessageChannel for SelectiveChannel {
    fn publish(&self, topic: &str, payload: String) -> Result<(), ChannelError> {
        if payload.contains(&self.rejected_email) {
            return Err(ChannelError::Transport("broker refused message".to_string()));
        }
        self.inner.publish(topic, payload)
    }
}

/// Storage whose debt writes always lose the race.
#[derive(Default)]
pub(super) struct ContendedRepository {
    pub(super) inner: InMemoryOwnerRepository,
}

impl OwnerRepository for ContendedRepository {
    fn find_all(&self) -> Result<Vec<Owner>, RepositoryError> {
        self.inner.find_all()
    }

    fn find_by_id(&self, id: OwnerId) -> Result<Owner, RepositoryError> {
        self.inner.find_by_id(id)
    }

    fn save(&self, owner: NewOwner) -> Result<Owner, RepositoryError> {
        self.inner.save(owner)
    }

    fn update(&self, id: OwnerId, update: OwnerUpdate) -> Result<bool, RepositoryError> {
        self.inner.update(id, update)
    }

    fn remove(&self, id: OwnerId) -> Result<bool, RepositoryError> {
        self.inner.remove(id)
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.inner.clear()
    }

    fn swap_debt(
        &self,
        _id: OwnerId,
        _expected: Decimal,
        _updated: Decimal,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn save_property(
        &self,
        owner_id: OwnerId,
        property: NewProperty,
    ) -> Result<crate::register::Property, RepositoryError> {
        self.inner.save_property(owner_id, property)
    }

    fn update_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
        update: &PropertyUpdate,
    ) -> Result<bool, RepositoryError> {
        self.inner.update_property(owner_id, property_id, update)
    }

    fn remove_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
    ) -> Result<bool, RepositoryError> {
        self.inner.remove_property(owner_id, property_id)
    }
}

type Hook = Box<dyn Fn(&InMemoryOwnerRepository, OwnerId) + Send + Sync>;

/// Delegating storage that runs a callback around selected calls, standing in for
/// another writer landing between the caller's steps.
#[derive(Default)]
pub(super) struct InterleavedRepository {
    pub(super) inner: InMemoryOwnerRepository,
    pub(super) before_find: Option<Hook>,
    pub(super) before_update: Option<Hook>,
    pub(super) after_swap: Option<Hook>,
}

impl InterleavedRepository {
    fn run(&self, hook: &Option<Hook>, id: OwnerId) {
        if let Some(hook) = hook {
            hook(&self.inner, id);
        }
    }
}

impl OwnerRepository for InterleavedRepository {
    fn find_all(&self) -> Result<Vec<Owner>, RepositoryError> {
        self.inner.find_all()
    }

    fn find_by_id(&self, id: OwnerId) -> Result<Owner, RepositoryError> {
        self.run(&self.before_find, id);
        self.inner.find_by_id(id)
    }

    fn save(&self, owner: NewOwner) -> Result<Owner, RepositoryError> {
        self.inner.save(owner)
    }

    fn update(&self, id: OwnerId, update: OwnerUpdate) -> Result<bool, RepositoryError> {
        self.run(&self.before_update, id);
        self.inner.update(id, update)
    }

    fn remove(&self, id: OwnerId) -> Result<bool, RepositoryError> {
        self.inner.remove(id)
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.inner.clear()
    }

    fn swap_debt(
        &self,
        id: OwnerId,
        expected: Decimal,
        updated: Decimal,
    ) -> Result<bool, RepositoryError> {
        let swapped = self.inner.swap_debt(id, expected, updated)?;
        self.run(&self.after_swap, id);
        Ok(swapped)
    }

    fn save_property(
        &self,
        owner_id: OwnerId,
        property: NewProperty,
    ) -> Result<crate::register::Property, RepositoryError> {
        self.inner.save_property(owner_id, property)
    }

    fn update_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
        update: &PropertyUpdate,
    ) -> Result<bool, RepositoryError> {
        self.inner.update_property(owner_id, property_id, update)
    }

    fn remove_property(
        &self,
        owner_id: OwnerId,
        property_id: PropertyId,
    ) -> Result<bool, RepositoryError> {
        self.inner.remove_property(owner_id, property_id)
    }
}

pub(super) type TestRegister = PropertyRegister<InMemoryOwnerRepository, MemoryChannel>;

pub(super) fn build_register() -> (
    TestRegister,
    Arc<InMemoryOwnerRepository>,
    Arc<MemoryChannel>,
) {
    build_register_with_rates(TaxRateTable::seeded())
}

pub(super) fn build_register_with_rates(
    rates: TaxRateTable,
) -> (
    TestRegister,
    Arc<InMemoryOwnerRepository>,
    Arc<MemoryChannel>,
) {
    let repository = Arc::new(InMemoryOwnerRepository::new());
    let channel = Arc::new(MemoryChannel::default());
    let register = PropertyRegister::new(
        repository.clone(),
        channel.clone(),
        Arc::new(rates),
        &RegisterConfig::default(),
    );
    (register, repository, channel)
}
