use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::directory::OwnerDirectory;
use super::domain::{Owner, OwnerId};
use super::ledger::{normalize, DebtLedger};
use super::repository::{ChannelError, MessageChannel, OwnerRepository, RepositoryError};

/// Template selector understood by the downstream e-mail renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailType {
    AllDebtorNotification,
    SingleDebtorNotification,
}

/// Payload published for each notified debtor. `params` carries the owner id so a
/// consumer can deduplicate redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailEvent {
    pub email: String,
    #[serde(rename = "type")]
    pub email_type: EmailType,
    pub params: BTreeMap<String, String>,
}

impl EmailEvent {
    pub fn for_debtor(owner: &Owner, email_type: EmailType) -> Self {
        let mut params = BTreeMap::new();
        params.insert("ownerId".to_string(), owner.id.to_string());
        params.insert("firstName".to_string(), owner.first_name.clone());
        params.insert("lastName".to_string(), owner.last_name.clone());
        params.insert("debt".to_string(), normalize(owner.taxes_debt).to_string());
        Self {
            email: owner.email.clone(),
            email_type,
            params,
        }
    }
}

/// Emits debtor e-mail events onto the message channel. Fire-and-forget: nothing is
/// retried here.
pub struct NotificationDispatcher<R, C> {
    directory: OwnerDirectory<R>,
    channel: Arc<C>,
    ledger: DebtLedger,
    topic: String,
}

impl<R, C> NotificationDispatcher<R, C>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    pub fn new(repository: Arc<R>, channel: Arc<C>, topic: impl Into<String>) -> Self {
        Self {
            directory: OwnerDirectory::new(repository),
            channel,
            ledger: DebtLedger,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// One event per current debtor. A failed emission is reported in the summary and
    /// does not stop the remaining debtors.
    pub fn notify_all_debtors(&self) -> Result<DispatchSummary, NotificationError> {
        let debtors = self.directory.find_debtors()?;
        if debtors.is_empty() {
            return Err(NotificationError::NoDebtorsInList);
        }

        let mut summary = DispatchSummary::default();
        for debtor in &debtors {
            match self.emit(debtor, EmailType::AllDebtorNotification) {
                Ok(()) => summary.notified.push(debtor.id),
                Err(error) => {
                    warn!(owner_id = %debtor.id, %error, "debtor notification failed");
                    summary.failed.push(DispatchFailure {
                        owner_id: debtor.id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            notified = summary.notified.len(),
            failed = summary.failed.len(),
            topic = %self.topic,
            "debtor notifications dispatched"
        );
        Ok(summary)
    }

    pub fn notify_debtor_by_id(&self, owner_id: OwnerId) -> Result<EmailEvent, NotificationError> {
        let owner = match self.directory.find_by_id(owner_id) {
            Ok(owner) => owner,
            Err(RepositoryError::NoSuchOwner(id)) => return Err(NotificationError::NoSuchOwner(id)),
            Err(other) => return Err(other.into()),
        };
        if !self.ledger.is_debtor(&owner) {
            return Err(NotificationError::NoTaxDebt(owner_id));
        }

        let event = EmailEvent::for_debtor(&owner, EmailType::SingleDebtorNotification);
        self.publish(&event)?;
        info!(owner_id = %owner_id, topic = %self.topic, "debtor notified");
        Ok(event)
    }

    fn emit(&self, owner: &Owner, email_type: EmailType) -> Result<(), NotificationError> {
        self.publish(&EmailEvent::for_debtor(owner, email_type))
    }

    fn publish(&self, event: &EmailEvent) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(event)?;
        self.channel.publish(&self.topic, payload)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub notified: Vec<OwnerId>,
    pub failed: Vec<DispatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub owner_id: OwnerId,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("there are no debtors in the owner list")]
    NoDebtorsInList,
    #[error("owner with id: {0} does not exist")]
    NoSuchOwner(OwnerId),
    #[error("owner with id: {0} has no tax debt")]
    NoTaxDebt(OwnerId),
    #[error("unable to serialize email event: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
