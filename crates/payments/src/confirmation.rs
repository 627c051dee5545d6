use jobboard_core::{DomainError, DomainResult, TransactionId};

/// The four fields a client sends back after checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub transaction_id: TransactionId,
}

impl PaymentConfirmation {
    /// All four fields must be present and non-blank; the transaction id must
    /// be well-formed.
    pub fn from_parts(
        order_id: Option<&str>,
        payment_id: Option<&str>,
        signature: Option<&str>,
        transaction_id: Option<&str>,
    ) -> DomainResult<Self> {
        let present = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        match (
            present(order_id),
            present(payment_id),
            present(signature),
            present(transaction_id),
        ) {
            (Some(order_id), Some(payment_id), Some(signature), Some(transaction_id)) => Ok(Self {
                order_id,
                payment_id,
                signature,
                transaction_id: TransactionId::parse_str(&transaction_id)?,
            }),
            _ => Err(DomainError::validation(
                "missing required payment verification fields",
            )),
        }
    }
}
