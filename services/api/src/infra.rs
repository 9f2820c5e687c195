use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use property_register::config::RegisterConfig;
use property_register::error::AppError;
use property_register::register::{
    ChannelError, FamilyStatus, InMemoryOwnerRepository, MessageChannel, NewOwner, NewProperty,
    Owner, PropertyCondition, PropertyRegister, PropertyType, TaxRateTable,
};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub(crate) type ServiceRegister = PropertyRegister<InMemoryOwnerRepository, InMemoryMessageChannel>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PublishedMessage {
    pub(crate) topic: String,
    pub(crate) payload: String,
}

/// Events retained by the in-memory channel before the oldest are dropped.
pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Stands in for the e-mail queue. Keeps the most recent `capacity` events.
#[derive(Clone)]
pub(crate) struct InMemoryMessageChannel {
    messages: Arc<Mutex<VecDeque<PublishedMessage>>>,
    capacity: usize,
}

impl InMemoryMessageChannel {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .map(|guard| guard.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryMessageChannel {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl MessageChannel for InMemoryMessageChannel {
    fn publish(&self, topic: &str, payload: String) -> Result<(), ChannelError> {
        let mut guard = self
            .messages
            .lock()
            .map_err(|_| ChannelError::Transport("channel mutex poisoned".to_string()))?;
        info!(topic, bytes = payload.len(), "event published");
        if guard.len() == self.capacity {
            guard.pop_front();
            debug!(capacity = self.capacity, "oldest retained event dropped");
        }
        guard.push_back(PublishedMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}

pub(crate) fn build_register(
    config: &RegisterConfig,
) -> (Arc<ServiceRegister>, Arc<InMemoryMessageChannel>) {
    let channel = Arc::new(InMemoryMessageChannel::default());
    let register = PropertyRegister::new(
        Arc::new(InMemoryOwnerRepository::new()),
        Arc::clone(&channel),
        Arc::new(TaxRateTable::seeded()),
        config,
    );
    (Arc::new(register), channel)
}

/// Stores the three reference owners and returns them with their assigned ids.
pub(crate) fn seed_demo_owners(register: &ServiceRegister) -> Result<Vec<Owner>, AppError> {
    let owners = vec![
        NewOwner {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            age: 30,
            family_status: FamilyStatus::Single,
            has_children: false,
            email: "johnsmith@gmail.com".to_string(),
            phone_number: "+456987123".to_string(),
            birthday: ymd(1994, 8, 9)?,
            taxes_debt: Decimal::ZERO,
            properties: vec![NewProperty {
                property_type: PropertyType::Flat,
                city: "Prague".to_string(),
                address: "Heroev Street 24".to_string(),
                area: Decimal::from(70),
                number_of_rooms: 3,
                cost: Decimal::from(500_000),
                date_of_building: ymd(2020, 4, 10)?,
                date_of_becoming_owner: ymd(2012, 1, 9)?,
                condition: PropertyCondition::Good,
            }],
        },
        NewOwner {
            first_name: "Linda".to_string(),
            last_name: "Johnson".to_string(),
            age: 31,
            family_status: FamilyStatus::Married,
            has_children: true,
            email: "lindajohnson@gmail.com".to_string(),
            phone_number: "+789456147".to_string(),
            birthday: ymd(1993, 7, 17)?,
            taxes_debt: Decimal::ZERO,
            properties: vec![NewProperty {
                property_type: PropertyType::House,
                city: "Prague".to_string(),
                address: "Boris Niemcov Street 220".to_string(),
                area: Decimal::from(150),
                number_of_rooms: 5,
                cost: Decimal::from(750_000),
                date_of_building: ymd(2020, 4, 10)?,
                date_of_becoming_owner: ymd(2012, 1, 9)?,
                condition: PropertyCondition::Good,
            }],
        },
        NewOwner {
            first_name: "Dan".to_string(),
            last_name: "Kravets".to_string(),
            age: 30,
            family_status: FamilyStatus::Single,
            has_children: false,
            email: "dankravets@gmail.com".to_string(),
            phone_number: "+784578457".to_string(),
            birthday: ymd(1994, 1, 31)?,
            taxes_debt: Decimal::ZERO,
            properties: vec![NewProperty {
                property_type: PropertyType::Office,
                city: "Prague".to_string(),
                address: "Evropska 6".to_string(),
                area: Decimal::from(300),
                number_of_rooms: 10,
                cost: Decimal::from(1_000_000),
                date_of_building: ymd(2023, 4, 10)?,
                date_of_becoming_owner: ymd(2023, 1, 9)?,
                condition: PropertyCondition::Good,
            }],
        },
    ];

    owners
        .into_iter()
        .map(|owner| register.owners.add_owner(owner).map_err(AppError::from))
        .collect()
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid demo date {year}-{month}-{day}"),
        ))
    })
}

pub(crate) fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    PropertyType::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = PropertyType::ALL.iter().map(|kind| kind.label()).collect();
        format!("unknown property type '{raw}' (expected one of {})", known.join(", "))
    })
}

pub(crate) fn parse_tax(raw: &str) -> Result<Decimal, String> {
    let tax = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as a decimal rate ({err})"))?;
    if tax.is_sign_negative() {
        return Err(format!("tax rate cannot be negative, got '{raw}'"));
    }
    Ok(tax)
}
