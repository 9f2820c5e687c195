use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::assessment::TaxAssessor;
use super::directory::OwnerDirectory;
use super::domain::OwnerId;
use super::ledger::DebtLedger;
use super::rates::{RateError, RateSnapshot, TaxRateTable};
use super::repository::{OwnerRepository, RepositoryError};

/// Attempts per owner before a contended debt write is reported as a failure.
pub const DEFAULT_WRITE_ATTEMPTS: u8 = 3;

/// What a pass does to each owner's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecountKind {
    /// Charge the assessed obligation.
    Assessment,
    /// Add the late-payment surcharge to existing debtors.
    Surcharge,
}

/// Drives a full pass over the owner population.
pub struct DebtRecountCycle<R> {
    repository: Arc<R>,
    directory: OwnerDirectory<R>,
    rates: Arc<TaxRateTable>,
    assessor: TaxAssessor,
    ledger: DebtLedger,
    surcharge_percent: Decimal,
    write_attempts: u8,
}

impl<R> DebtRecountCycle<R>
where
    R: OwnerRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        rates: Arc<TaxRateTable>,
        assessor: TaxAssessor,
        surcharge_percent: Decimal,
    ) -> Self {
        let directory = OwnerDirectory::new(Arc::clone(&repository));
        Self {
            repository,
            directory,
            rates,
            assessor,
            ledger: DebtLedger,
            surcharge_percent,
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }

    pub fn with_write_attempts(mut self, attempts: u8) -> Self {
        self.write_attempts = attempts.max(1);
        self
    }

    /// Charges every owner their assessed obligation.
    pub fn run(&self) -> Result<RecountSummary, RepositoryError> {
        self.run_until_cancelled(&CancellationToken::new())
    }

    pub fn run_until_cancelled(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RecountSummary, RepositoryError> {
        self.pass(RecountKind::Assessment, cancel)
    }

    /// Adds the configured surcharge percentage to every debtor's balance.
    pub fn accrue_surcharge(&self) -> Result<RecountSummary, RepositoryError> {
        self.accrue_surcharge_until_cancelled(&CancellationToken::new())
    }

    pub fn accrue_surcharge_until_cancelled(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RecountSummary, RepositoryError> {
        self.pass(RecountKind::Surcharge, cancel)
    }

    fn pass(
        &self,
        kind: RecountKind,
        cancel: &CancellationToken,
    ) -> Result<RecountSummary, RepositoryError> {
        let owner_ids = self.directory.snapshot_ids()?;
        let rates = self.rates.snapshot();
        info!(?kind, owners = owner_ids.len(), "debt recount started");

        let mut summary = RecountSummary::new(kind);
        for (position, owner_id) in owner_ids.iter().copied().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                summary.remaining = owner_ids.len() - position;
                warn!(?kind, remaining = summary.remaining, "debt recount cancelled");
                break;
            }

            match self.recount_owner(kind, owner_id, &rates) {
                Ok(()) => summary.processed += 1,
                Err(error) => {
                    warn!(?kind, owner_id = %owner_id, %error, "owner skipped during debt recount");
                    summary.failed.push(RecountFailure {
                        owner_id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            ?kind,
            processed = summary.processed,
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "debt recount finished"
        );
        Ok(summary)
    }

    /// Reads, computes, and compare-and-swaps one owner's balance. Nothing is written
    /// unless the full new balance is known.
    fn recount_owner(
        &self,
        kind: RecountKind,
        owner_id: OwnerId,
        rates: &RateSnapshot,
    ) -> Result<(), RecountError> {
        for attempt in 1..=self.write_attempts {
            let owner = self.repository.find_by_id(owner_id)?;
            let previous = owner.taxes_debt;
            let updated = match kind {
                RecountKind::Assessment => {
                    let obligation = self.assessor.assess(&owner, rates)?;
                    self.ledger.accumulate(owner, obligation).taxes_debt
                }
                RecountKind::Surcharge => {
                    self.ledger
                        .accrue_surcharge(owner, self.surcharge_percent)
                        .taxes_debt
                }
            };

            if updated == previous {
                return Ok(());
            }
            if self.repository.swap_debt(owner_id, previous, updated)? {
                debug!(owner_id = %owner_id, %previous, %updated, "debt balance updated");
                return Ok(());
            }
            debug!(owner_id = %owner_id, attempt, "debt balance changed concurrently, retrying");
        }

        Err(RecountError::Contended {
            attempts: self.write_attempts,
        })
    }
}

/// Outcome of one pass. Per-owner failures never abort the pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecountSummary {
    pub kind: RecountKind,
    pub processed: usize,
    pub failed: Vec<RecountFailure>,
    pub cancelled: bool,
    /// Owners from the snapshot that were not visited because of cancellation.
    pub remaining: usize,
}

impl RecountSummary {
    fn new(kind: RecountKind) -> Self {
        Self {
            kind,
            processed: 0,
            failed: Vec::new(),
            cancelled: false,
            remaining: 0,
        }
    }

    pub fn failed_ids(&self) -> Vec<OwnerId> {
        self.failed.iter().map(|failure| failure.owner_id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecountFailure {
    pub owner_id: OwnerId,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecountError {
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("debt balance kept changing after {attempts} attempt(s)")]
    Contended { attempts: u8 },
}
