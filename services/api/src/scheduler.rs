use crate::infra::ServiceRegister;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs a debt recount every `period` until `cancel` fires. A pass in flight stops at
/// the next owner boundary.
pub(crate) fn spawn_recount_scheduler(
    register: Arc<ServiceRegister>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let register = Arc::clone(&register);
            let token = cancel.clone();
            let pass =
                tokio::task::spawn_blocking(move || register.recount.run_until_cancelled(&token));
            match pass.await {
                Ok(Ok(summary)) => info!(
                    processed = summary.processed,
                    failed = summary.failed.len(),
                    cancelled = summary.cancelled,
                    "scheduled debt recount completed"
                ),
                Ok(Err(error)) => warn!(%error, "scheduled debt recount failed"),
                Err(error) => warn!(%error, "scheduled debt recount task aborted"),
            }
        }

        info!("debt recount scheduler stopped");
    })
}
