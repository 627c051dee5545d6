//! Promotion reconciliation.
//!
//! Payment verification marks the transaction paid before promoting the job,
//! as two separate writes. This worker finds paid transactions whose job is
//! still not premium and promotes it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use jobboard_jobs::Job;

use crate::notifier::Notifier;
use crate::store::{JobStore, StoreError, TransactionStore};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub scanned: u64,
    pub repaired: u64,
    pub missing_jobs: u64,
    /// Jobs whose lookup or promotion errored; retried on the next pass.
    pub failed: u64,
}

#[derive(Clone)]
pub struct PromotionReconciler {
    transactions: Arc<dyn TransactionStore>,
    jobs: Arc<dyn JobStore>,
    notifier: Notifier,
}

impl PromotionReconciler {
    pub fn new(transactions: Arc<dyn TransactionStore>, jobs: Arc<dyn JobStore>, notifier: Notifier) -> Self {
        Self {
            transactions,
            jobs,
            notifier,
        }
    }

    /// One pass. Safe to run repeatedly: already-premium jobs are left alone.
    ///
    /// Only listing the paid transactions can fail the pass. A failure on a
    /// single job is logged, counted and skipped.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<ReconcileReport, StoreError> {
        let mut report = ReconcileReport::default();
        for txn in self.transactions.list_paid_with_job().await? {
            let Some(job_id) = txn.job_id else { continue };
            report.scanned += 1;

            let job = match self.jobs.get(job_id).await {
                Ok(Some(job)) => job,
                Ok(None) => {
                    warn!(transaction_id = %txn.id, %job_id, "paid transaction references a missing job");
                    report.missing_jobs += 1;
                    continue;
                }
                Err(err) => {
                    warn!(transaction_id = %txn.id, %job_id, error = %err, "job lookup failed during reconciliation");
                    report.failed += 1;
                    continue;
                }
            };
            if job.is_premium {
                continue;
            }

            let expires_at = Job::premium_expiry(now);
            match self.jobs.promote_if_standard(job_id, expires_at).await {
                Ok(true) => {
                    info!(transaction_id = %txn.id, %job_id, %expires_at, "promotion repaired");
                    self.notifier.job_promoted(job.id, job.posted_by, expires_at);
                    report.repaired += 1;
                }
                // Promoted or deleted since the read above.
                Ok(false) => {}
                Err(err) => {
                    warn!(transaction_id = %txn.id, %job_id, error = %err, "promotion repair failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Run [`Self::run_once`] every `interval` until shut down.
    pub fn spawn(self, interval: Duration) -> ReconcilerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match self.run_once(Utc::now()).await {
                            Ok(report) if report.repaired > 0 || report.missing_jobs > 0 || report.failed > 0 => {
                                info!(?report, "reconciliation pass finished");
                            }
                            Ok(_) => {}
                            Err(err) => warn!(error = %err, "reconciliation pass failed"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        ReconcilerHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to stop a spawned reconciler.
#[derive(Debug)]
pub struct ReconcilerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Request shutdown and wait for the loop to stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}
