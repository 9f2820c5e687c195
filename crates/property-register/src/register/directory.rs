use std::sync::Arc;

use super::domain::{Owner, OwnerId};
use super::ledger::DebtLedger;
use super::repository::{OwnerRepository, RepositoryError};

/// Read-side view of the owner population used by batch scans.
pub struct OwnerDirectory<R> {
    repository: Arc<R>,
    ledger: DebtLedger,
}

impl<R> Clone for OwnerDirectory<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            ledger: self.ledger,
        }
    }
}

impl<R> OwnerDirectory<R>
where
    R: OwnerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            ledger: DebtLedger,
        }
    }

    pub fn find_all(&self) -> Result<Vec<Owner>, RepositoryError> {
        self.repository.find_all()
    }

    pub fn find_by_id(&self, id: OwnerId) -> Result<Owner, RepositoryError> {
        self.repository.find_by_id(id)
    }

    pub fn find_debtors(&self) -> Result<Vec<Owner>, RepositoryError> {
        Ok(self
            .repository
            .find_all()?
            .into_iter()
            .filter(|owner| self.ledger.is_debtor(owner))
            .collect())
    }

    /// Ids of every owner known right now. Owners added afterwards are not part of
    /// the snapshot.
    pub fn snapshot_ids(&self) -> Result<Vec<OwnerId>, RepositoryError> {
        Ok(self
            .repository
            .find_all()?
            .into_iter()
            .map(|owner| owner.id)
            .collect())
    }
}
