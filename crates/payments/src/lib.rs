//! Premium-promotion payments: amounts, provider orders, signature checks and
//! the transaction state machine (`created → paid`, `paid` absorbing).

pub mod amount;
pub mod confirmation;
pub mod order;
pub mod signature;
pub mod transaction;

pub use amount::{Amount, Currency, DEFAULT_CURRENCY};
pub use confirmation::PaymentConfirmation;
pub use order::{OrderRequest, PaymentProvider, ProviderError, ProviderOrder, receipt_for};
pub use signature::{SignatureError, sign, verify};
pub use transaction::{PROVIDER_NAME, Transaction, TransactionStatus, VerifyOutcome};
