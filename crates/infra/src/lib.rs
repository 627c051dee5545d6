//! Infrastructure layer: storage adapters, the payment provider client,
//! mail, realtime fan-out and the workflow services built on them.

pub mod mailer;
pub mod notification;
pub mod notifier;
pub mod razorpay;
pub mod reconcile;
pub mod services;
pub mod store;

pub use mailer::{EmailMessage, LogMailer, MailError, Mailer};
pub use notification::Notification;
pub use notifier::Notifier;
pub use razorpay::RazorpayClient;
pub use reconcile::{PromotionReconciler, ReconcileReport, ReconcilerHandle};
pub use services::{ServiceError, ServiceResult, ServiceSet, ServiceSettings};
pub use store::{StoreError, Stores};
