use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of an owner, unique across the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

/// Identifier of a property, assigned by storage when the property is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u64);

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of taxable property kinds. Every variant needs a rate table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Flat,
    House,
    Office,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [PropertyType::Flat, PropertyType::House, PropertyType::Office];

    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Flat => "FLAT",
            PropertyType::House => "HOUSE",
            PropertyType::Office => "OFFICE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FLAT" => Some(Self::Flat),
            "HOUSE" => Some(Self::House),
            "OFFICE" => Some(Self::Office),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyCondition {
    New,
    Good,
    NeedsRepair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FamilyStatus {
    Single,
    Married,
}

/// A piece of real estate held by exactly one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub property_type: PropertyType,
    pub city: String,
    pub address: String,
    /// Square metres.
    pub area: Decimal,
    pub number_of_rooms: u16,
    pub cost: Decimal,
    pub date_of_building: NaiveDate,
    pub date_of_becoming_owner: NaiveDate,
    pub condition: PropertyCondition,
}

/// Property payload supplied by callers; the id is assigned on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub property_type: PropertyType,
    pub city: String,
    pub address: String,
    pub area: Decimal,
    pub number_of_rooms: u16,
    pub cost: Decimal,
    pub date_of_building: NaiveDate,
    pub date_of_becoming_owner: NaiveDate,
    pub condition: PropertyCondition,
}

impl NewProperty {
    pub fn into_property(self, id: PropertyId) -> Property {
        Property {
            id,
            property_type: self.property_type,
            city: self.city,
            address: self.address,
            area: self.area,
            number_of_rooms: self.number_of_rooms,
            cost: self.cost,
            date_of_building: self.date_of_building,
            date_of_becoming_owner: self.date_of_becoming_owner,
            condition: self.condition,
        }
    }
}

/// In-place property edit. Only numeric and date fields are mutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    #[serde(default)]
    pub area: Option<Decimal>,
    #[serde(default)]
    pub number_of_rooms: Option<u16>,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub date_of_becoming_owner: Option<NaiveDate>,
}

impl PropertyUpdate {
    pub fn apply_to(&self, property: &mut Property) {
        if let Some(area) = self.area {
            property.area = area;
        }
        if let Some(rooms) = self.number_of_rooms {
            property.number_of_rooms = rooms;
        }
        if let Some(cost) = self.cost {
            property.cost = cost;
        }
        if let Some(date) = self.date_of_becoming_owner {
            property.date_of_becoming_owner = date;
        }
    }
}

/// Unit of persistence and of notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub family_status: FamilyStatus,
    pub has_children: bool,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    /// Running unpaid balance. Never negative.
    pub taxes_debt: Decimal,
    pub properties: Vec<Property>,
}

impl Owner {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Owner payload supplied by callers; ids are assigned on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOwner {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub family_status: FamilyStatus,
    pub has_children: bool,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub taxes_debt: Decimal,
    #[serde(default)]
    pub properties: Vec<NewProperty>,
}

/// Replacement of an owner's personal, household and contact fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerUpdate {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub family_status: FamilyStatus,
    pub has_children: bool,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
}

impl OwnerUpdate {
    pub fn apply_to(self, owner: &mut Owner) {
        owner.first_name = self.first_name;
        owner.last_name = self.last_name;
        owner.age = self.age;
        owner.family_status = self.family_status;
        owner.has_children = self.has_children;
        owner.email = self.email;
        owner.phone_number = self.phone_number;
        owner.birthday = self.birthday;
    }
}

/// Active rate for one property type, applied per square metre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub id: u32,
    pub property_type: PropertyType,
    pub tax: Decimal,
}
