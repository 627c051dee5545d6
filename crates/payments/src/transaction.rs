use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult, Entity, JobId, TransactionId, UserId};

use crate::{Amount, Currency, ProviderOrder};

pub const PROVIDER_NAME: &str = "razorpay";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Created,
    Paid,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Created => "created",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refunded => "refunded",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw {
            "created" => Ok(TransactionStatus::Created),
            "paid" => Ok(TransactionStatus::Paid),
            "failed" => Ok(TransactionStatus::Failed),
            "refunded" => Ok(TransactionStatus::Refunded),
            other => Err(DomainError::invariant(format!("unknown transaction status {other}"))),
        }
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempt to pay for a premium promotion.
///
/// Persisted only after the provider has accepted the order, so every stored
/// transaction carries a provider order id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub employer_id: UserId,
    /// May reference a job that does not exist (yet).
    pub job_id: Option<JobId>,
    pub amount: Amount,
    pub currency: Currency,
    pub provider: String,
    pub provider_order_id: String,
    pub provider_payment_id: Option<String>,
    pub status: TransactionStatus,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}

/// Result of applying a verified confirmation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// `created → paid` happened now; follow-up effects should run.
    Paid,
    /// Already paid earlier; nothing changed.
    AlreadyPaid,
}

impl Transaction {
    pub fn open(
        id: TransactionId,
        employer_id: UserId,
        job_id: Option<JobId>,
        amount: Amount,
        currency: Currency,
        provider: &str,
        order: &ProviderOrder,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            employer_id,
            job_id,
            amount,
            currency,
            provider: provider.to_string(),
            provider_order_id: order.id.clone(),
            provider_payment_id: None,
            status: TransactionStatus::Created,
            meta: serde_json::json!({ "order": order.raw }),
            created_at: now,
            paid_at: None,
        }
    }

    /// Apply a confirmation whose signature has already been checked.
    ///
    /// `paid` is absorbing: a repeat returns [`VerifyOutcome::AlreadyPaid`]
    /// without touching the record. Otherwise the confirmed order id must be
    /// the one stored on this transaction.
    pub fn mark_paid(
        &mut self,
        order_id: &str,
        payment_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<VerifyOutcome> {
        match self.status {
            TransactionStatus::Paid => return Ok(VerifyOutcome::AlreadyPaid),
            TransactionStatus::Created => {}
            other => {
                return Err(DomainError::invalid_transition(format!(
                    "transaction is {other} and cannot be marked paid"
                )));
            }
        }
        if self.provider_order_id != order_id {
            return Err(DomainError::validation(
                "order ID mismatch for this transaction record",
            ));
        }
        self.provider_payment_id = Some(payment_id.to_string());
        self.status = TransactionStatus::Paid;
        self.paid_at = Some(now);
        Ok(VerifyOutcome::Paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> ProviderOrder {
        ProviderOrder {
            id: "order_O1".into(),
            amount: 10_000,
            currency: "INR".into(),
            receipt: Some("rcpt_1".into()),
            status: Some("created".into()),
            raw: serde_json::json!({ "id": "order_O1" }),
        }
    }

    fn txn() -> Transaction {
        Transaction::open(
            TransactionId::new(),
            UserId::new(),
            Some(JobId::new()),
            Amount::from_minor(10_000).unwrap(),
            Currency::default(),
            PROVIDER_NAME,
            &order(),
            Utc::now(),
        )
    }

    #[test]
    fn open_records_the_provider_order() {
        let t = txn();
        assert_eq!(t.status, TransactionStatus::Created);
        assert_eq!(t.provider_order_id, "order_O1");
        assert_eq!(t.meta["order"]["id"], "order_O1");
    }

    #[test]
    fn mark_paid_is_idempotent() {
        let mut t = txn();
        let now = Utc::now();
        assert_eq!(t.mark_paid("order_O1", "pay_1", now).unwrap(), VerifyOutcome::Paid);
        let after_first = t.clone();

        let outcome = t.mark_paid("order_O1", "pay_2", Utc::now()).unwrap();
        assert_eq!(outcome, VerifyOutcome::AlreadyPaid);
        assert_eq!(t, after_first);
        assert_eq!(t.provider_payment_id.as_deref(), Some("pay_1"));
        assert_eq!(t.paid_at, Some(now));
    }

    #[test]
    fn order_mismatch_is_rejected_without_change() {
        let mut t = txn();
        let before = t.clone();
        let err = t.mark_paid("order_OTHER", "pay_1", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(t, before);
    }

    #[test]
    fn failed_transactions_cannot_become_paid() {
        let mut t = txn();
        t.status = TransactionStatus::Failed;
        assert!(matches!(
            t.mark_paid("order_O1", "pay_1", Utc::now()),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[test]
    fn serializes_status_lowercase_and_amount_major() {
        let json = serde_json::to_value(txn()).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["currency"], "INR");
    }
}
