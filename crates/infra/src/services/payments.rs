//! Premium-promotion payments: order creation, verification and history.
//!
//! Verification writes the paid transaction before promoting the job. The two
//! writes are independent; a crash in between leaves a paid transaction with
//! an unpromoted job, which [`crate::reconcile::PromotionReconciler`] repairs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use jobboard_auth::{Action, Principal, authorize};
use jobboard_core::{DomainError, JobId, TransactionId};
use jobboard_jobs::Job;
use jobboard_payments::{
    Amount, Currency, OrderRequest, PaymentConfirmation, PaymentProvider, ProviderError,
    ProviderOrder, Transaction, VerifyOutcome, receipt_for, verify,
};

use super::ServiceResult;
use super::applications::JobRef;
use crate::notifier::Notifier;
use crate::store::{JobStore, TransactionStore};

pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handed back to the client to open checkout. Carries the public key id only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order: ProviderOrder,
    pub transaction_id: TransactionId,
    pub key_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayment {
    pub transaction: Transaction,
    pub already_paid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub job: Option<JobRef>,
}

/// Raw verification input as received from the client.
#[derive(Debug, Clone, Default)]
pub struct VerifyRequest<'a> {
    pub order_id: Option<&'a str>,
    pub payment_id: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct PaymentService {
    transactions: Arc<dyn TransactionStore>,
    jobs: Arc<dyn JobStore>,
    provider: Arc<dyn PaymentProvider>,
    key_secret: Arc<str>,
    timeout: Duration,
    notifier: Notifier,
}

impl PaymentService {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        jobs: Arc<dyn JobStore>,
        provider: Arc<dyn PaymentProvider>,
        key_secret: &str,
        timeout: Duration,
        notifier: Notifier,
    ) -> Self {
        Self {
            transactions,
            jobs,
            provider,
            key_secret: Arc::from(key_secret),
            timeout,
            notifier,
        }
    }

    /// Create a provider order and record a `created` transaction.
    ///
    /// The job id is only format-checked; the job may not exist yet. Nothing
    /// is stored unless the provider call succeeds within the timeout.
    #[instrument(skip(self, amount), fields(user_id = %principal.user_id), err)]
    pub async fn create_order(
        &self,
        principal: &Principal,
        amount: Option<&Value>,
        currency: Option<&str>,
        job_id: Option<&str>,
    ) -> ServiceResult<CreatedOrder> {
        authorize(principal, &Action::CreatePaymentOrder)?;
        let amount = Amount::from_json(amount)?;
        let currency = Currency::parse(currency)?;
        let job_id = job_id
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(JobId::parse_str)
            .transpose()?;

        let now = Utc::now();
        let request = OrderRequest::new(amount, &currency, receipt_for(principal.user_id, now));
        let order = tokio::time::timeout(self.timeout, self.provider.create_order(&request))
            .await
            .map_err(|_| ProviderError::Timeout)??;

        let txn = Transaction::open(
            TransactionId::new(),
            principal.user_id,
            job_id,
            amount,
            currency,
            self.provider.name(),
            &order,
            now,
        );
        self.transactions.insert(txn.clone()).await?;
        info!(transaction_id = %txn.id, order_id = %order.id, "payment order created");

        Ok(CreatedOrder {
            order,
            transaction_id: txn.id,
            key_id: self.provider.key_id().to_string(),
        })
    }

    /// Verify a checkout confirmation and promote the referenced job.
    ///
    /// The signature is checked before the transaction is even loaded, so a
    /// tampered request never touches storage. A repeat of a successful
    /// verification returns the stored record unchanged.
    #[instrument(skip_all, err)]
    pub async fn verify(
        &self,
        principal: Option<&Principal>,
        request: VerifyRequest<'_>,
    ) -> ServiceResult<VerifiedPayment> {
        let confirmation = PaymentConfirmation::from_parts(
            request.order_id,
            request.payment_id,
            request.signature,
            request.transaction_id,
        )?;
        verify(
            self.key_secret.as_bytes(),
            &confirmation.order_id,
            &confirmation.payment_id,
            &confirmation.signature,
        )
        .inspect_err(|_| {
            warn!(
                transaction_id = %confirmation.transaction_id,
                order_id = %confirmation.order_id,
                "payment signature rejected"
            )
        })?;

        let mut txn = self
            .transactions
            .get(confirmation.transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("transaction"))?;

        if let Some(p) = principal {
            if p.user_id != txn.employer_id {
                warn!(
                    transaction_id = %txn.id,
                    caller = %p.user_id,
                    employer_id = %txn.employer_id,
                    "payment verified by a user other than the paying employer"
                );
            }
        }

        let now = Utc::now();
        match txn.mark_paid(&confirmation.order_id, &confirmation.payment_id, now)? {
            VerifyOutcome::AlreadyPaid => {
                info!(transaction_id = %txn.id, "payment already verified");
                return Ok(VerifiedPayment {
                    transaction: txn,
                    already_paid: true,
                });
            }
            VerifyOutcome::Paid => {}
        }
        if !self.transactions.mark_paid(&txn).await? {
            let stored = self
                .transactions
                .get(txn.id)
                .await?
                .ok_or_else(|| DomainError::not_found("transaction"))?;
            info!(transaction_id = %txn.id, "payment verified concurrently by another request");
            return Ok(VerifiedPayment {
                transaction: stored,
                already_paid: true,
            });
        }
        info!(transaction_id = %txn.id, "payment verified");

        if let Some(job_id) = txn.job_id {
            self.promote(job_id).await;
        }

        Ok(VerifiedPayment {
            transaction: txn,
            already_paid: false,
        })
    }

    /// Newest first, each with the title of the job it paid for.
    pub async fn history(&self, principal: &Principal) -> ServiceResult<Vec<TransactionView>> {
        authorize(principal, &Action::ViewTransactionHistory)?;
        let transactions = self.transactions.list_by_employer(principal.user_id).await?;
        let job_ids: Vec<JobId> = transactions.iter().filter_map(|t| t.job_id).collect();
        let titles: HashMap<JobId, String> = if job_ids.is_empty() {
            HashMap::new()
        } else {
            self.jobs
                .get_many(&job_ids)
                .await?
                .into_iter()
                .map(|j| (j.id, j.title))
                .collect()
        };

        Ok(transactions
            .into_iter()
            .map(|transaction| TransactionView {
                job: transaction.job_id.and_then(|id| {
                    titles.get(&id).map(|title| JobRef {
                        id,
                        title: title.clone(),
                    })
                }),
                transaction,
            })
            .collect())
    }

    /// Best-effort: the payment is already recorded, so failures here are
    /// logged and left to the reconciler.
    async fn promote(&self, job_id: JobId) {
        let expires_at = Job::premium_expiry(Utc::now());
        match self.jobs.promote(job_id, expires_at).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(%job_id, "paid transaction references a missing job; promotion skipped");
                return;
            }
            Err(err) => {
                warn!(%job_id, error = %err, "job promotion failed; deferred to reconciliation");
                return;
            }
        }
        info!(%job_id, %expires_at, "job promoted to premium");
        match self.jobs.get(job_id).await {
            Ok(Some(job)) => self.notifier.job_promoted(job.id, job.posted_by, expires_at),
            Ok(None) => warn!(%job_id, "promoted job vanished before notification"),
            Err(err) => warn!(%job_id, error = %err, "job lookup failed; promotion notice skipped"),
        }
    }
}
