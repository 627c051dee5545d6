//! Storage contracts.
//!
//! Services only talk to these traits. Uniqueness that matters for
//! correctness (user email, one application per job/candidate pair) is
//! enforced by every implementation, not by callers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use jobboard_applications::{Application, ApplicationStatus};
use jobboard_auth::User;
use jobboard_core::{ApplicationId, JobId, NotificationId, PageRequest, TransactionId, UserId};
use jobboard_jobs::{Job, JobFilter};
use jobboard_payments::Transaction;

use crate::notification::Notification;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{
    InMemoryApplicationStore, InMemoryJobCascade, InMemoryJobStore, InMemoryNotificationStore,
    InMemoryTransactionStore, InMemoryUserStore, MemoryTable,
};
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A conditional write found the record changed since it was read.
    #[error("stale write: {0}")]
    Stale(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: Job) -> Result<(), StoreError>;
    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;
    async fn get_many(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError>;
    /// Write the owner-editable fields; `NotFound` if it vanished.
    ///
    /// Owner, counter and the premium fields are left as stored.
    async fn update(&self, job: Job) -> Result<(), StoreError>;
    /// Set `is_premium` and `expires_at`. Returns `false` when the job is gone.
    async fn promote(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError>;
    /// Like [`JobStore::promote`], but only for a job that is not premium yet.
    /// Returns whether this call promoted it.
    async fn promote_if_standard(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError>;
    /// Newest first. Returns the page and the total number of matches.
    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, u64), StoreError>;
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Job>, StoreError>;
    /// Atomic `+1`; returns the new count.
    async fn increment_application_count(&self, id: JobId) -> Result<u64, StoreError>;
    /// Returns whether a job was removed.
    async fn delete(&self, id: JobId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fails with `Duplicate` when the `(job, candidate)` pair exists.
    async fn insert(&self, application: Application) -> Result<(), StoreError>;
    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError>;
    async fn find_by_pair(&self, job: JobId, candidate: UserId) -> Result<Option<Application>, StoreError>;
    /// Compare-and-set: writes only while the stored status is still
    /// `expected`, `Stale` otherwise.
    async fn update(&self, application: Application, expected: ApplicationStatus) -> Result<(), StoreError>;
    /// Newest first.
    async fn list_by_candidate(&self, candidate: UserId) -> Result<Vec<Application>, StoreError>;
    /// Newest first.
    async fn list_by_jobs(&self, jobs: &[JobId]) -> Result<Vec<Application>, StoreError>;
    /// Returns how many were removed.
    async fn delete_by_job(&self, job: JobId) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, txn: Transaction) -> Result<(), StoreError>;
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;
    /// Record the `created -> paid` move carried by `txn`.
    ///
    /// Returns `true` only for the call that made the move; a transaction
    /// already paid is left untouched and yields `false`.
    async fn mark_paid(&self, txn: &Transaction) -> Result<bool, StoreError>;
    /// Newest first.
    async fn list_by_employer(&self, employer: UserId) -> Result<Vec<Transaction>, StoreError>;
    /// Paid transactions that reference a job (reconciliation input).
    async fn list_paid_with_job(&self) -> Result<Vec<Transaction>, StoreError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: Notification) -> Result<(), StoreError>;
    async fn get(&self, id: NotificationId) -> Result<Option<Notification>, StoreError>;
    async fn update(&self, notification: Notification) -> Result<(), StoreError>;
    /// Newest first.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, StoreError>;
}

/// Outcome of a cascading job delete.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub applications_removed: u64,
    pub job_removed: bool,
}

/// Removes a job together with its applications.
///
/// Applications go first, so an interrupted cascade never leaves applications
/// pointing at a deleted job. Backends with transactions run both deletes in
/// one.
#[async_trait]
pub trait JobCascade: Send + Sync {
    async fn delete_job_cascade(&self, job: JobId) -> Result<CascadeOutcome, StoreError>;
}

/// Every store a service set needs, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub jobs: Arc<dyn JobStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub cascade: Arc<dyn JobCascade>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let jobs = Arc::new(InMemoryJobStore::default());
        let applications = Arc::new(InMemoryApplicationStore::default());
        Self {
            users: Arc::new(InMemoryUserStore::default()),
            cascade: Arc::new(InMemoryJobCascade::new(jobs.clone(), applications.clone())),
            jobs,
            applications,
            transactions: Arc::new(InMemoryTransactionStore::default()),
            notifications: Arc::new(InMemoryNotificationStore::default()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            jobs: store.clone(),
            applications: store.clone(),
            transactions: store.clone(),
            notifications: store.clone(),
            cascade: store,
        }
    }
}
