//! In-memory stores for tests/dev.
//!
//! Each store is a [`MemoryTable`] behind a `RwLock`. Uniqueness checks run
//! under the same write lock as the insert, so they hold under concurrency
//! just like a database constraint.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use jobboard_applications::{Application, ApplicationStatus};
use jobboard_auth::User;
use jobboard_core::{ApplicationId, Entity, JobId, NotificationId, PageRequest, TransactionId, UserId};
use jobboard_jobs::{Job, JobFilter};
use jobboard_payments::{Transaction, TransactionStatus};

use super::{
    ApplicationStore, CascadeOutcome, JobCascade, JobStore, NotificationStore, StoreError,
    TransactionStore, UserStore,
};
use crate::notification::Notification;

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

/// A keyed collection of entities.
#[derive(Debug)]
pub struct MemoryTable<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> Default for MemoryTable<E> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> MemoryTable<E>
where
    E: Entity + Clone,
{
    pub fn read<R>(&self, f: impl FnOnce(&HashMap<E::Id, E>) -> R) -> Result<R, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(f(&map))
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut HashMap<E::Id, E>) -> R) -> Result<R, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(f(&mut map))
    }

    pub fn get(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        self.read(|map| map.get(&id).cloned())
    }

    /// Insert unless an existing row `conflicts` with the new one.
    pub fn insert_unique(
        &self,
        entity: E,
        conflicts: impl Fn(&E, &E) -> bool,
        message: &str,
    ) -> Result<(), StoreError> {
        self.write(|map| {
            if map.contains_key(&entity.id()) || map.values().any(|existing| conflicts(existing, &entity)) {
                return Err(StoreError::Duplicate(message.to_string()));
            }
            map.insert(entity.id(), entity);
            Ok(())
        })?
    }

    pub fn replace(&self, entity: E, what: &'static str) -> Result<(), StoreError> {
        self.write(|map| match map.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity;
                Ok(())
            }
            None => Err(StoreError::NotFound(what)),
        })?
    }

    pub fn filter(&self, pred: impl Fn(&E) -> bool) -> Result<Vec<E>, StoreError> {
        self.read(|map| map.values().filter(|e| pred(e)).cloned().collect())
    }

    pub fn remove(&self, id: E::Id) -> Result<bool, StoreError> {
        self.write(|map| map.remove(&id).is_some())
    }

    pub fn remove_where(&self, pred: impl Fn(&E) -> bool) -> Result<u64, StoreError> {
        self.write(|map| {
            let before = map.len();
            map.retain(|_, e| !pred(e));
            (before - map.len()) as u64
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: MemoryTable<User>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        self.table
            .insert_unique(user, |a, b| a.email == b.email, "email already registered")
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.table.get(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.table
            .read(|map| map.values().find(|u| u.email == email).cloned())
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.table.read(|map| ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    table: MemoryTable<Job>,
}

fn newest_jobs_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        self.table.insert_unique(job, |_, _| false, "job already exists")
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        self.table.get(id)
    }

    async fn get_many(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError> {
        self.table.read(|map| ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    /// Keeps the stored owner, counter and premium fields, like the SQL update.
    async fn update(&self, job: Job) -> Result<(), StoreError> {
        self.table.write(|map| match map.get_mut(&job.id) {
            Some(slot) => {
                *slot = Job {
                    posted_by: slot.posted_by,
                    application_count: slot.application_count,
                    is_premium: slot.is_premium,
                    expires_at: slot.expires_at,
                    ..job
                };
                Ok(())
            }
            None => Err(StoreError::NotFound("job")),
        })?
    }

    async fn promote(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.table.write(|map| match map.get_mut(&id) {
            Some(job) => {
                job.is_premium = true;
                job.expires_at = Some(expires_at);
                true
            }
            None => false,
        })
    }

    async fn promote_if_standard(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.table.write(|map| match map.get_mut(&id) {
            Some(job) if !job.is_premium => {
                job.is_premium = true;
                job.expires_at = Some(expires_at);
                true
            }
            _ => false,
        })
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, u64), StoreError> {
        let mut matching = self.table.filter(|job| filter.matches(job))?;
        newest_jobs_first(&mut matching);
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.skip()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok((items, total))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Job>, StoreError> {
        let mut jobs = self.table.filter(|job| job.posted_by == owner)?;
        newest_jobs_first(&mut jobs);
        Ok(jobs)
    }

    async fn increment_application_count(&self, id: JobId) -> Result<u64, StoreError> {
        self.table.write(|map| match map.get_mut(&id) {
            Some(job) => {
                job.application_count += 1;
                Ok(job.application_count)
            }
            None => Err(StoreError::NotFound("job")),
        })?
    }

    async fn delete(&self, id: JobId) -> Result<bool, StoreError> {
        self.table.remove(id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    table: MemoryTable<Application>,
}

fn newest_applications_first(apps: &mut [Application]) {
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, application: Application) -> Result<(), StoreError> {
        self.table.insert_unique(
            application,
            |a, b| a.job_id == b.job_id && a.candidate_id == b.candidate_id,
            "already applied to this job",
        )
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        self.table.get(id)
    }

    async fn find_by_pair(&self, job: JobId, candidate: UserId) -> Result<Option<Application>, StoreError> {
        self.table.read(|map| {
            map.values()
                .find(|a| a.job_id == job && a.candidate_id == candidate)
                .cloned()
        })
    }

    async fn update(&self, application: Application, expected: ApplicationStatus) -> Result<(), StoreError> {
        self.table.write(|map| match map.get_mut(&application.id) {
            Some(slot) if slot.status == expected => {
                *slot = application;
                Ok(())
            }
            Some(slot) => Err(StoreError::Stale(format!(
                "application status changed to {} since it was read",
                slot.status
            ))),
            None => Err(StoreError::NotFound("application")),
        })?
    }

    async fn list_by_candidate(&self, candidate: UserId) -> Result<Vec<Application>, StoreError> {
        let mut apps = self.table.filter(|a| a.candidate_id == candidate)?;
        newest_applications_first(&mut apps);
        Ok(apps)
    }

    async fn list_by_jobs(&self, jobs: &[JobId]) -> Result<Vec<Application>, StoreError> {
        let mut apps = self.table.filter(|a| jobs.contains(&a.job_id))?;
        newest_applications_first(&mut apps);
        Ok(apps)
    }

    async fn delete_by_job(&self, job: JobId) -> Result<u64, StoreError> {
        self.table.remove_where(|a| a.job_id == job)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    table: MemoryTable<Transaction>,
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, txn: Transaction) -> Result<(), StoreError> {
        self.table.insert_unique(
            txn,
            |a, b| a.provider_order_id == b.provider_order_id,
            "provider order already recorded",
        )
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        self.table.get(id)
    }

    async fn mark_paid(&self, txn: &Transaction) -> Result<bool, StoreError> {
        self.table.write(|map| match map.get_mut(&txn.id) {
            Some(slot) if slot.status == TransactionStatus::Created => {
                slot.provider_payment_id = txn.provider_payment_id.clone();
                slot.status = txn.status;
                slot.paid_at = txn.paid_at;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound("transaction")),
        })?
    }

    async fn list_by_employer(&self, employer: UserId) -> Result<Vec<Transaction>, StoreError> {
        let mut txns = self.table.filter(|t| t.employer_id == employer)?;
        txns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(txns)
    }

    async fn list_paid_with_job(&self) -> Result<Vec<Transaction>, StoreError> {
        self.table
            .filter(|t| t.status == TransactionStatus::Paid && t.job_id.is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    table: MemoryTable<Notification>,
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: Notification) -> Result<(), StoreError> {
        self.table
            .insert_unique(notification, |_, _| false, "notification already exists")
    }

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>, StoreError> {
        self.table.get(id)
    }

    async fn update(&self, notification: Notification) -> Result<(), StoreError> {
        self.table.replace(notification, "notification")
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        let mut items = self.table.filter(|n| n.user_id == user)?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }
}

/// Sequential cascade over the two in-memory tables (applications first).
#[derive(Debug)]
pub struct InMemoryJobCascade {
    jobs: Arc<InMemoryJobStore>,
    applications: Arc<InMemoryApplicationStore>,
}

impl InMemoryJobCascade {
    pub fn new(jobs: Arc<InMemoryJobStore>, applications: Arc<InMemoryApplicationStore>) -> Self {
        Self { jobs, applications }
    }
}

#[async_trait]
impl JobCascade for InMemoryJobCascade {
    async fn delete_job_cascade(&self, job: JobId) -> Result<CascadeOutcome, StoreError> {
        let applications_removed = self.applications.delete_by_job(job).await?;
        let job_removed = self.jobs.delete(job).await?;
        Ok(CascadeOutcome {
            applications_removed,
            job_removed,
        })
    }
}
