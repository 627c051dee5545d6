//! Postgres-backed stores (cargo feature `postgres`).
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | `StoreError` |
//! |---|---|---|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | any | `Backend` |
//! | Pool closed / IO / decode | n/a | `Backend` |
//!
//! The cascade delete runs inside one SQL transaction.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use jobboard_applications::{Application, ApplicationStatus};
use jobboard_auth::{Role, User};
use jobboard_core::{ApplicationId, JobId, NotificationId, PageRequest, TransactionId, UserId};
use jobboard_jobs::{Job, JobFilter};
use jobboard_payments::{Amount, Currency, Transaction, TransactionStatus};

use super::{
    ApplicationStore, CascadeOutcome, JobCascade, JobStore, NotificationStore, StoreError,
    TransactionStore, UserStore,
};
use crate::notification::Notification;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// One pool serving every store trait.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema (idempotent).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn decode_err(field: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("failed to decode {field}: {err}"))
}

fn get<'r, T>(row: &'r PgRow, field: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<T, _>(field).map_err(|e| decode_err(field, e))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = get(row, "role")?;
    Ok(User {
        id: UserId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        email: get(row, "email")?,
        password_hash: get(row, "password_hash")?,
        role: Role::from_str(&role).map_err(|e| decode_err("role", e))?,
        created_at: get(row, "created_at")?,
    })
}

fn job_from_row(row: &PgRow) -> Result<Job, StoreError> {
    let count: i64 = get(row, "application_count")?;
    Ok(Job {
        id: JobId::from_uuid(get(row, "id")?),
        title: get(row, "title")?,
        company: get(row, "company")?,
        location: get(row, "location")?,
        salary: get(row, "salary")?,
        description: get(row, "description")?,
        category: get(row, "category")?,
        experience_level: get(row, "experience_level")?,
        perks: get(row, "perks")?,
        posted_by: UserId::from_uuid(get(row, "posted_by")?),
        is_premium: get(row, "is_premium")?,
        expires_at: get(row, "expires_at")?,
        application_count: u64::try_from(count).map_err(|e| decode_err("application_count", e))?,
        created_at: get(row, "created_at")?,
    })
}

fn application_from_row(row: &PgRow) -> Result<Application, StoreError> {
    let status: String = get(row, "status")?;
    Ok(Application {
        id: ApplicationId::from_uuid(get(row, "id")?),
        job_id: JobId::from_uuid(get(row, "job_id")?),
        candidate_id: UserId::from_uuid(get(row, "candidate_id")?),
        resume_link: get(row, "resume_link")?,
        cover_letter: get(row, "cover_letter")?,
        status: ApplicationStatus::from_str(&status).map_err(|e| decode_err("status", e))?,
        applied_at: get(row, "applied_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, StoreError> {
    let status: String = get(row, "status")?;
    let currency: String = get(row, "currency")?;
    let job_id: Option<Uuid> = get(row, "job_id")?;
    Ok(Transaction {
        id: TransactionId::from_uuid(get(row, "id")?),
        employer_id: UserId::from_uuid(get(row, "employer_id")?),
        job_id: job_id.map(JobId::from_uuid),
        amount: Amount::from_minor(get(row, "amount_minor")?).map_err(|e| decode_err("amount_minor", e))?,
        currency: Currency::parse(Some(currency.as_str())).map_err(|e| decode_err("currency", e))?,
        provider: get(row, "provider")?,
        provider_order_id: get(row, "provider_order_id")?,
        provider_payment_id: get(row, "provider_payment_id")?,
        status: TransactionStatus::parse(&status).map_err(|e| decode_err("status", e))?,
        meta: get(row, "meta")?,
        created_at: get(row, "created_at")?,
        paid_at: get(row, "paid_at")?,
    })
}

fn notification_from_row(row: &PgRow) -> Result<Notification, StoreError> {
    Ok(Notification {
        id: NotificationId::from_uuid(get(row, "id")?),
        user_id: UserId::from_uuid(get(row, "user_id")?),
        title: get(row, "title")?,
        message: get(row, "message")?,
        read: get(row, "read")?,
        created_at: get(row, "created_at")?,
    })
}

fn collect<T>(rows: Vec<PgRow>, f: fn(&PgRow) -> Result<T, StoreError>) -> Result<Vec<T>, StoreError> {
    rows.iter().map(f).collect()
}

fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_job_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    qb.push(" WHERE TRUE");
    if let Some(q) = &filter.q {
        qb.push(" AND title ILIKE ").push_bind(like_pattern(q));
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ").push_bind(like_pattern(location));
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(level) = &filter.experience_level {
        qb.push(" AND experience_level = ").push_bind(level.clone());
    }
    if let Some(premium) = filter.is_premium {
        qb.push(" AND is_premium = ").push_bind(premium);
    }
}

const JOB_COLUMNS: &str = "id, title, company, location, salary, description, category, \
     experience_level, perks, posted_by, is_premium, expires_at, application_count, created_at";

const TRANSACTION_COLUMNS: &str = "id, employer_id, job_id, amount_minor, currency, provider, \
     provider_order_id, provider_payment_id, status, meta, created_at, paid_at";

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query("SELECT * FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_users", e))?;
        collect(rows, user_from_row)
    }
}

#[async_trait]
impl JobStore for PgStore {
    #[instrument(skip(self, job), fields(job_id = %job.id), err)]
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, company, location, salary, description, category,
                experience_level, perks, posted_by, is_premium, expires_at,
                application_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(&job.description)
        .bind(&job.category)
        .bind(&job.experience_level)
        .bind(&job.perks)
        .bind(job.posted_by.as_uuid())
        .bind(job.is_premium)
        .bind(job.expires_at)
        .bind(job.application_count as i64)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_job", e))?;
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_job", e))?;
        row.as_ref().map(job_from_row).transpose()
    }

    async fn get_many(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_jobs", e))?;
        collect(rows, job_from_row)
    }

    /// Never touches `posted_by`, `application_count` or the premium fields:
    /// ownership is fixed, the counter only moves through the atomic
    /// increment, and promotion has its own writes.
    async fn update(&self, job: Job) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                title = $2, company = $3, location = $4, salary = $5,
                description = $6, category = $7, experience_level = $8,
                perks = $9
            WHERE id = $1
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(&job.description)
        .bind(&job.category)
        .bind(&job.experience_level)
        .bind(&job.perks)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_job", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("job"));
        }
        Ok(())
    }

    async fn promote(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE jobs SET is_premium = TRUE, expires_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("promote_job", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn promote_if_standard(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE jobs SET is_premium = TRUE, expires_at = $2 WHERE id = $1 AND is_premium = FALSE",
        )
        .bind(id.as_uuid())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("promote_job_if_standard", e))?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, u64), StoreError> {
        let mut count_q = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM jobs");
        push_job_filter(&mut count_q, filter);
        let total: i64 = count_q
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_jobs", e))?
            .try_get("total")
            .map_err(|e| decode_err("total", e))?;

        let mut list_q = QueryBuilder::<Postgres>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        push_job_filter(&mut list_q, filter);
        list_q
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.skip()).unwrap_or(i64::MAX));
        let rows = list_q
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_jobs", e))?;

        Ok((collect(rows, job_from_row)?, total.max(0) as u64))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE posted_by = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_jobs_by_owner", e))?;
        collect(rows, job_from_row)
    }

    async fn increment_application_count(&self, id: JobId) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "UPDATE jobs SET application_count = application_count + 1 WHERE id = $1 RETURNING application_count",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment_application_count", e))?
        .ok_or(StoreError::NotFound("job"))?;
        let count: i64 = get(&row, "application_count")?;
        Ok(count.max(0) as u64)
    }

    async fn delete(&self, id: JobId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_job", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    #[instrument(skip(self, application), fields(application_id = %application.id), err)]
    async fn insert(&self, application: Application) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, job_id, candidate_id, resume_link, cover_letter, status, applied_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.job_id.as_uuid())
        .bind(application.candidate_id.as_uuid())
        .bind(&application.resume_link)
        .bind(&application.cover_letter)
        .bind(application.status.as_str())
        .bind(application.applied_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_application", e))?;
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_application", e))?;
        row.as_ref().map(application_from_row).transpose()
    }

    async fn find_by_pair(&self, job: JobId, candidate: UserId) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query("SELECT * FROM applications WHERE job_id = $1 AND candidate_id = $2")
            .bind(job.as_uuid())
            .bind(candidate.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_application_by_pair", e))?;
        row.as_ref().map(application_from_row).transpose()
    }

    async fn update(&self, application: Application, expected: ApplicationStatus) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE applications SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(application.id.as_uuid())
        .bind(application.status.as_str())
        .bind(application.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_application", e))?;
        if result.rows_affected() == 1 {
            return Ok(());
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM applications WHERE id = $1")
            .bind(application.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_application", e))?;
        match current {
            Some(status) => Err(StoreError::Stale(format!(
                "application status changed to {status} since it was read"
            ))),
            None => Err(StoreError::NotFound("application")),
        }
    }

    async fn list_by_candidate(&self, candidate: UserId) -> Result<Vec<Application>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM applications WHERE candidate_id = $1 ORDER BY applied_at DESC, id DESC",
        )
        .bind(candidate.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_applications_by_candidate", e))?;
        collect(rows, application_from_row)
    }

    async fn list_by_jobs(&self, jobs: &[JobId]) -> Result<Vec<Application>, StoreError> {
        let ids: Vec<Uuid> = jobs.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            "SELECT * FROM applications WHERE job_id = ANY($1) ORDER BY applied_at DESC, id DESC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_applications_by_jobs", e))?;
        collect(rows, application_from_row)
    }

    async fn delete_by_job(&self, job: JobId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(job.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_applications_by_job", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TransactionStore for PgStore {
    #[instrument(skip(self, txn), fields(transaction_id = %txn.id), err)]
    async fn insert(&self, txn: Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, employer_id, job_id, amount_minor, currency, provider,
                provider_order_id, provider_payment_id, status, meta, created_at, paid_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(txn.id.as_uuid())
        .bind(txn.employer_id.as_uuid())
        .bind(txn.job_id.map(Uuid::from))
        .bind(txn.amount.minor())
        .bind(txn.currency.as_str())
        .bind(&txn.provider)
        .bind(&txn.provider_order_id)
        .bind(&txn.provider_payment_id)
        .bind(txn.status.as_str())
        .bind(&txn.meta)
        .bind(txn.created_at)
        .bind(txn.paid_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_transaction", e))?;
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(&format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_transaction", e))?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    /// Only the verification fields are mutable. The `status = 'created'`
    /// guard lets exactly one concurrent verification through.
    async fn mark_paid(&self, txn: &Transaction) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET provider_payment_id = $2, status = $3, paid_at = $4
            WHERE id = $1 AND status = 'created'
            "#,
        )
        .bind(txn.id.as_uuid())
        .bind(&txn.provider_payment_id)
        .bind(txn.status.as_str())
        .bind(txn.paid_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_transaction_paid", e))?;
        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM transactions WHERE id = $1")
            .bind(txn.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("mark_transaction_paid", e))?;
        match exists {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound("transaction")),
        }
    }

    async fn list_by_employer(&self, employer: UserId) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE employer_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(employer.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_transactions_by_employer", e))?;
        collect(rows, transaction_from_row)
    }

    async fn list_paid_with_job(&self) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE status = 'paid' AND job_id IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_paid_transactions", e))?;
        collect(rows, transaction_from_row)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert(&self, n: Notification) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, title, message, read, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(n.id.as_uuid())
        .bind(n.user_id.as_uuid())
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.read)
        .bind(n.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_notification", e))?;
        Ok(())
    }

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>, StoreError> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_notification", e))?;
        row.as_ref().map(notification_from_row).transpose()
    }

    /// `read` can only be set, never cleared.
    async fn update(&self, n: Notification) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE notifications SET read = read OR $2 WHERE id = $1")
            .bind(n.id.as_uuid())
            .bind(n.read)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_notification", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("notification"));
        }
        Ok(())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_notifications", e))?;
        collect(rows, notification_from_row)
    }
}

#[async_trait]
impl JobCascade for PgStore {
    #[instrument(skip(self), fields(job_id = %job), err)]
    async fn delete_job_cascade(&self, job: JobId) -> Result<CascadeOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_cascade", e))?;

        let applications = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(job.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("cascade_delete_applications", e))?;
        let jobs = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("cascade_delete_job", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_cascade", e))?;

        Ok(CascadeOutcome {
            applications_removed: applications.rows_affected(),
            job_removed: jobs.rows_affected() > 0,
        })
    }
}
