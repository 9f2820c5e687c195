//! Debt and tax assessment engine.
//!
//! Owners and their properties live behind [`OwnerRepository`]; [`TaxAssessor`] turns
//! them into yearly obligations using the active [`TaxRateTable`];
//! [`DebtRecountCycle`] charges those obligations onto each owner's balance; and
//! [`NotificationDispatcher`] tells debtors about it over a [`MessageChannel`].

pub mod assessment;
pub mod directory;
pub mod domain;
pub mod ledger;
pub mod memory;
pub mod notification;
pub mod rates;
pub mod recount;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use assessment::{Assessment, BaseCharge, Household, LeewayTable, TaxAssessor};
pub use directory::OwnerDirectory;
pub use domain::{
    FamilyStatus, NewOwner, NewProperty, Owner, OwnerId, OwnerUpdate, Property,
    PropertyCondition, PropertyId, PropertyType, PropertyUpdate, TaxRate,
};
pub use ledger::DebtLedger;
pub use memory::{IdSequence, InMemoryOwnerRepository};
pub use notification::{
    DispatchFailure, DispatchSummary, EmailEvent, EmailType, NotificationDispatcher,
    NotificationError,
};
pub use rates::{RateError, RateSnapshot, TaxRateTable};
pub use recount::{DebtRecountCycle, RecountError, RecountFailure, RecountKind, RecountSummary};
pub use repository::{ChannelError, MessageChannel, OwnerRepository, RepositoryError};
pub use router::register_router;
pub use service::{OwnerService, OwnerServiceError};

use crate::config::RegisterConfig;

/// Every register component wired against one repository, channel and rate table.
pub struct PropertyRegister<R, C> {
    pub owners: OwnerService<R>,
    pub recount: DebtRecountCycle<R>,
    pub notifications: NotificationDispatcher<R, C>,
    pub rates: Arc<TaxRateTable>,
}

impl<R, C> PropertyRegister<R, C>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    pub fn new(
        repository: Arc<R>,
        channel: Arc<C>,
        rates: Arc<TaxRateTable>,
        config: &RegisterConfig,
    ) -> Self {
        let assessor = TaxAssessor::default();
        Self {
            owners: OwnerService::new(Arc::clone(&repository), Arc::clone(&rates), assessor.clone()),
            recount: DebtRecountCycle::new(
                Arc::clone(&repository),
                Arc::clone(&rates),
                assessor,
                config.surcharge_percent,
            ),
            notifications: NotificationDispatcher::new(
                repository,
                channel,
                config.email_topic.clone(),
            ),
            rates,
        }
    }
}
