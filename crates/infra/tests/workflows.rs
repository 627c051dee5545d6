//! End-to-end workflow tests over the in-memory stores.
//!
//! The payment provider and the mailer are fakes; everything else is the
//! production wiring from `ServiceSet::new`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use jobboard_applications::{Application, ApplicationDraft, ApplicationStatus};
use jobboard_auth::Principal;
use jobboard_core::{ApplicationId, DomainError, JobId, PageRequest, TransactionId, UserId};
use jobboard_events::DomainEvent;
use jobboard_infra::mailer::{EmailMessage, MailError, Mailer};
use jobboard_infra::services::VerifyRequest;
use jobboard_infra::store::{ApplicationStore, JobStore, TransactionStore};
use jobboard_infra::{ServiceError, ServiceSet, ServiceSettings, StoreError, Stores};
use jobboard_jobs::{Job, JobDraft, JobFilter};
use jobboard_payments::{
    OrderRequest, PaymentProvider, ProviderError, ProviderOrder, SignatureError, Transaction,
    TransactionStatus, sign,
};

const PAYMENT_SECRET: &str = "test_payment_secret";

struct FakeProvider {
    next: AtomicU64,
    delay: Duration,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            delay: Duration::ZERO,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            next: AtomicU64::new(1),
            delay,
        }
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    fn key_id(&self) -> &str {
        "rzp_test_key"
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<ProviderOrder, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderOrder {
            id: format!("order_{n}"),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".into()),
            raw: json!({ "id": format!("order_{n}"), "amount": request.amount }),
        })
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: EmailMessage) -> Result<(), MailError> {
        Err(MailError::Transport("smtp down".into()))
    }
}

/// Delegates to a real job store, with a delay on `get`, a counter on
/// promotions and an optional job whose promotion always fails.
struct InstrumentedJobs {
    inner: Arc<dyn JobStore>,
    get_delay: Duration,
    promotions: AtomicU64,
    broken: Mutex<Option<JobId>>,
}

impl InstrumentedJobs {
    fn wrap(inner: Arc<dyn JobStore>) -> Self {
        Self {
            inner,
            get_delay: Duration::ZERO,
            promotions: AtomicU64::new(0),
            broken: Mutex::new(None),
        }
    }

    fn check(&self, id: JobId) -> Result<(), StoreError> {
        if *self.broken.lock().unwrap() == Some(id) {
            return Err(StoreError::Backend("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for InstrumentedJobs {
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        self.inner.insert(job).await
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let snapshot = self.inner.get(id).await;
        if !self.get_delay.is_zero() {
            tokio::time::sleep(self.get_delay).await;
        }
        snapshot
    }

    async fn get_many(&self, ids: &[JobId]) -> Result<Vec<Job>, StoreError> {
        self.inner.get_many(ids).await
    }

    async fn update(&self, job: Job) -> Result<(), StoreError> {
        self.inner.update(job).await
    }

    async fn promote(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.check(id)?;
        self.promotions.fetch_add(1, Ordering::SeqCst);
        self.inner.promote(id, expires_at).await
    }

    async fn promote_if_standard(&self, id: JobId, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.check(id)?;
        self.promotions.fetch_add(1, Ordering::SeqCst);
        self.inner.promote_if_standard(id, expires_at).await
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, u64), StoreError> {
        self.inner.list(filter, page).await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Job>, StoreError> {
        self.inner.list_by_owner(owner).await
    }

    async fn increment_application_count(&self, id: JobId) -> Result<u64, StoreError> {
        self.inner.increment_application_count(id).await
    }

    async fn delete(&self, id: JobId) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }
}

/// Reads lag behind, so two requests can both act on the same snapshot.
struct SlowApplications(Arc<dyn ApplicationStore>);

#[async_trait]
impl ApplicationStore for SlowApplications {
    async fn insert(&self, application: Application) -> Result<(), StoreError> {
        self.0.insert(application).await
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        let snapshot = self.0.get(id).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        snapshot
    }

    async fn find_by_pair(&self, job: JobId, candidate: UserId) -> Result<Option<Application>, StoreError> {
        self.0.find_by_pair(job, candidate).await
    }

    async fn update(&self, application: Application, expected: ApplicationStatus) -> Result<(), StoreError> {
        self.0.update(application, expected).await
    }

    async fn list_by_candidate(&self, candidate: UserId) -> Result<Vec<Application>, StoreError> {
        self.0.list_by_candidate(candidate).await
    }

    async fn list_by_jobs(&self, jobs: &[JobId]) -> Result<Vec<Application>, StoreError> {
        self.0.list_by_jobs(jobs).await
    }

    async fn delete_by_job(&self, job: JobId) -> Result<u64, StoreError> {
        self.0.delete_by_job(job).await
    }
}

struct SlowTransactions(Arc<dyn TransactionStore>);

#[async_trait]
impl TransactionStore for SlowTransactions {
    async fn insert(&self, txn: Transaction) -> Result<(), StoreError> {
        self.0.insert(txn).await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let snapshot = self.0.get(id).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        snapshot
    }

    async fn mark_paid(&self, txn: &Transaction) -> Result<bool, StoreError> {
        self.0.mark_paid(txn).await
    }

    async fn list_by_employer(&self, employer: UserId) -> Result<Vec<Transaction>, StoreError> {
        self.0.list_by_employer(employer).await
    }

    async fn list_paid_with_job(&self) -> Result<Vec<Transaction>, StoreError> {
        self.0.list_paid_with_job().await
    }
}

struct Harness {
    services: ServiceSet,
    stores: Stores,
    mailer: Arc<RecordingMailer>,
}

fn settings() -> ServiceSettings {
    let mut settings = ServiceSettings::new("test_jwt_secret", PAYMENT_SECRET);
    settings.payment_timeout = Duration::from_millis(200);
    settings.email_timeout = Duration::from_millis(200);
    settings
}

fn harness() -> Harness {
    harness_with(Arc::new(FakeProvider::new()), settings())
}

fn harness_with(provider: Arc<dyn PaymentProvider>, settings: ServiceSettings) -> Harness {
    harness_over(Stores::in_memory(), provider, settings)
}

fn harness_with_stores(stores: Stores) -> Harness {
    harness_over(stores, Arc::new(FakeProvider::new()), settings())
}

fn harness_over(stores: Stores, provider: Arc<dyn PaymentProvider>, settings: ServiceSettings) -> Harness {
    let mailer = Arc::new(RecordingMailer::default());
    let services = ServiceSet::new(stores.clone(), provider, mailer.clone(), settings);
    Harness {
        services,
        stores,
        mailer,
    }
}

async fn register(h: &Harness, name: &str, role: &str) -> Principal {
    let email = format!("{}@example.com", name.to_lowercase());
    let session = h
        .services
        .auth
        .register(Some(name), Some(&email), Some("secret123"), Some(role))
        .await
        .unwrap();
    Principal::new(session.user.id, session.user.role)
}

async fn post_job(h: &Harness, employer: &Principal, title: &str) -> Job {
    h.services
        .jobs
        .create(
            employer,
            JobDraft {
                title: Some(title.into()),
                company: Some("Acme".into()),
                location: Some("Pune".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

fn draft() -> ApplicationDraft {
    ApplicationDraft {
        resume_link: Some("https://cv.example.com/c".into()),
        cover_letter: Some("hello".into()),
    }
}

/// Poll until `check` passes; background fan-out runs on spawned tasks.
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn duplicate_apply_is_a_conflict_and_count_stays_at_one() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    assert!(!job.is_premium);

    h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();
    let err = h
        .services
        .applications
        .apply(&candidate, job.id, draft())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));

    let stored = h.stores.jobs.get(job.id).await.unwrap().unwrap();
    assert_eq!(stored.application_count, 1);
    assert_eq!(h.services.applications.list_mine(&candidate).await.unwrap().len(), 1);
}

#[tokio::test]
async fn applying_to_a_missing_job_creates_nothing() {
    let h = harness();
    let candidate = register(&h, "Candidate", "candidate").await;

    let err = h
        .services
        .applications
        .apply(&candidate, JobId::new(), draft())
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Domain(DomainError::not_found("job")));
    assert!(h.services.applications.list_mine(&candidate).await.unwrap().is_empty());
}

#[tokio::test]
async fn apply_notifies_the_employer_in_the_background() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let mut events = h.services.bus.subscribe();

    h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    let notifications = h.services.notifications.clone();
    eventually(|| {
        let notifications = notifications.clone();
        async move { !notifications.list(&employer).await.unwrap().is_empty() }
    })
    .await;
    let stored = h.services.notifications.list(&employer).await.unwrap();
    assert_eq!(stored[0].title, "New Application");
    assert_eq!(stored[0].message.as_deref(), Some("Candidate applied to Rust Engineer"));

    let mailer = h.mailer.clone();
    eventually(|| {
        let mailer = mailer.clone();
        async move { mailer.subjects().contains(&"New Application for Rust Engineer".to_string()) }
    })
    .await;

    let envelope = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let envelope = events.recv().await.unwrap();
            if matches!(envelope.payload(), DomainEvent::ApplicationSubmitted { .. }) {
                return envelope;
            }
        }
    })
    .await
    .unwrap();
    assert!(envelope.channel().reaches(employer.user_id));
    assert!(!envelope.channel().reaches(candidate.user_id));
}

#[tokio::test]
async fn failing_email_never_fails_the_apply() {
    let stores = Stores::in_memory();
    let services = ServiceSet::new(
        stores.clone(),
        Arc::new(FakeProvider::new()),
        Arc::new(FailingMailer),
        settings(),
    );
    let h = Harness {
        services,
        stores,
        mailer: Arc::new(RecordingMailer::default()),
    };
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;

    let application = h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::Applied);

    let notifications = h.services.notifications.clone();
    eventually(|| {
        let notifications = notifications.clone();
        async move { !notifications.list(&employer).await.unwrap().is_empty() }
    })
    .await;
}

#[tokio::test]
async fn verified_payment_promotes_the_job_once() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let job_id = job.id.to_string();

    let created = h
        .services
        .payments
        .create_order(&employer, Some(&json!(100.00)), Some("INR"), Some(&job_id))
        .await
        .unwrap();
    assert_eq!(created.order.amount, 10_000);
    assert_eq!(created.key_id, "rzp_test_key");

    let signature = sign(PAYMENT_SECRET.as_bytes(), &created.order.id, "pay_1").unwrap();
    let txn_id = created.transaction_id.to_string();
    let request = VerifyRequest {
        order_id: Some(&created.order.id),
        payment_id: Some("pay_1"),
        signature: Some(&signature),
        transaction_id: Some(&txn_id),
    };

    let first = h.services.payments.verify(Some(&employer), request.clone()).await.unwrap();
    assert!(!first.already_paid);
    assert_eq!(first.transaction.status, TransactionStatus::Paid);
    assert_eq!(first.transaction.provider_payment_id.as_deref(), Some("pay_1"));

    let promoted = h.stores.jobs.get(job.id).await.unwrap().unwrap();
    assert!(promoted.is_premium);
    let expires_at = promoted.expires_at.unwrap();
    let days = (expires_at - Utc::now()).num_hours() as f64 / 24.0;
    assert!((29.9..=30.0).contains(&days), "expires in {days} days");

    let second = h.services.payments.verify(None, request).await.unwrap();
    assert!(second.already_paid);
    assert_eq!(second.transaction.paid_at, first.transaction.paid_at);
    let again = h.stores.jobs.get(job.id).await.unwrap().unwrap();
    assert_eq!(again.expires_at, Some(expires_at));
}

#[tokio::test]
async fn tampered_signature_never_touches_the_transaction() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let created = h
        .services
        .payments
        .create_order(&employer, Some(&json!("250")), None, None)
        .await
        .unwrap();

    let mut signature = sign(PAYMENT_SECRET.as_bytes(), &created.order.id, "pay_1").unwrap();
    let last = if signature.ends_with('0') { "1" } else { "0" };
    signature.replace_range(signature.len() - 1.., last);
    let txn_id = created.transaction_id.to_string();

    let err = h
        .services
        .payments
        .verify(
            Some(&employer),
            VerifyRequest {
                order_id: Some(&created.order.id),
                payment_id: Some("pay_1"),
                signature: Some(&signature),
                transaction_id: Some(&txn_id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Signature(SignatureError::Mismatch));

    let txn = h.stores.transactions.get(created.transaction_id).await.unwrap().unwrap();
    assert_eq!(txn.status, TransactionStatus::Created);
    assert!(txn.provider_payment_id.is_none());
}

#[tokio::test]
async fn signature_for_another_order_is_rejected_by_the_order_check() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let first = h
        .services
        .payments
        .create_order(&employer, Some(&json!(10)), None, None)
        .await
        .unwrap();
    let second = h
        .services
        .payments
        .create_order(&employer, Some(&json!(10)), None, None)
        .await
        .unwrap();

    // Valid signature for the first order, replayed against the second record.
    let signature = sign(PAYMENT_SECRET.as_bytes(), &first.order.id, "pay_9").unwrap();
    let txn_id = second.transaction_id.to_string();
    let err = h
        .services
        .payments
        .verify(
            None,
            VerifyRequest {
                order_id: Some(&first.order.id),
                payment_id: Some("pay_9"),
                signature: Some(&signature),
                transaction_id: Some(&txn_id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
}

#[tokio::test]
async fn provider_timeout_fails_the_order_and_records_nothing() {
    let h = harness_with(Arc::new(FakeProvider::slow(Duration::from_secs(2))), settings());
    let employer = register(&h, "Employer", "employer").await;

    let err = h
        .services
        .payments
        .create_order(&employer, Some(&json!(100)), None, None)
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Provider(ProviderError::Timeout));
    assert!(h.services.payments.history(&employer).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_owner_employer_cannot_advance_an_application() {
    let h = harness();
    let owner = register(&h, "Owner", "employer").await;
    let other = register(&h, "Other", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &owner, "Rust Engineer").await;
    let application = h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    let err = h
        .services
        .applications
        .update_status(&other, application.id, Some("Hired"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let stored = h.stores.applications.get(application.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Applied);
}

#[tokio::test]
async fn hired_application_cannot_be_withdrawn() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let application = h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    h.services
        .applications
        .update_status(&employer, application.id, Some("Hired"))
        .await
        .unwrap();
    let err = h
        .services
        .applications
        .withdraw(&candidate, application.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::Domain(DomainError::invalid_transition(
            "cannot withdraw application with status: Hired"
        ))
    );

    let stored = h.stores.applications.get(application.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Hired);
}

#[tokio::test]
async fn reviewed_is_accepted_as_shortlisted() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let application = h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    let updated = h
        .services
        .applications
        .update_status(&employer, application.id, Some("Reviewed"))
        .await
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Shortlisted);

    let err = h
        .services
        .applications
        .update_status(&employer, application.id, Some("Pending"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
}

#[tokio::test]
async fn deleting_a_job_removes_its_applications() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let application = h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    let outcome = h.services.jobs.delete(&employer, job.id).await.unwrap();
    assert_eq!(outcome.applications_removed, 1);
    assert!(h.stores.applications.get(application.id).await.unwrap().is_none());
    assert!(h.services.applications.list_mine(&candidate).await.unwrap().is_empty());
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete_a_job() {
    let h = harness();
    let owner = register(&h, "Owner", "employer").await;
    let other = register(&h, "Other", "employer").await;
    let job = post_job(&h, &owner, "Rust Engineer").await;

    // The patch is invalid too; ownership is still what gets reported.
    let err = h
        .services
        .jobs
        .update(
            &other,
            job.id,
            jobboard_jobs::JobPatch {
                title: Some("  ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert!(matches!(
        h.services.jobs.delete(&other, job.id).await.unwrap_err(),
        ServiceError::Forbidden(_)
    ));
}

#[tokio::test]
async fn job_list_filters_and_pages() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    for title in ["Rust Engineer", "Go Engineer", "Rust Intern"] {
        post_job(&h, &employer, title).await;
    }

    let filter = JobFilter::from_query(Some("rust"), None, None, None, None);
    let page = h
        .services
        .jobs
        .list(&filter, PageRequest::new(1, 1))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].job.title, "Rust Intern");
    assert_eq!(page.items[0].poster.as_ref().unwrap().name, "Employer");
}

#[tokio::test]
async fn reconciler_repairs_paid_but_unpromoted_jobs() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;

    let order = ProviderOrder {
        id: "order_R".into(),
        amount: 100,
        currency: "INR".into(),
        receipt: None,
        status: None,
        raw: json!({}),
    };
    let now = Utc::now();
    let mut paid = Transaction::open(
        TransactionId::new(),
        employer.user_id,
        Some(job.id),
        jobboard_payments::Amount::from_minor(100).unwrap(),
        Default::default(),
        "razorpay",
        &order,
        now,
    );
    paid.mark_paid("order_R", "pay_R", now).unwrap();
    h.stores.transactions.insert(paid).await.unwrap();

    let mut orphan = Transaction::open(
        TransactionId::new(),
        employer.user_id,
        Some(JobId::new()),
        jobboard_payments::Amount::from_minor(100).unwrap(),
        Default::default(),
        "razorpay",
        &ProviderOrder {
            id: "order_O".into(),
            ..order.clone()
        },
        now,
    );
    orphan.mark_paid("order_O", "pay_O", now).unwrap();
    h.stores.transactions.insert(orphan).await.unwrap();

    let report = h.services.reconciler.run_once(now).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.repaired, 1);
    assert_eq!(report.missing_jobs, 1);
    assert!(h.stores.jobs.get(job.id).await.unwrap().unwrap().is_premium);

    let again = h.services.reconciler.run_once(Utc::now()).await.unwrap();
    assert_eq!(again.repaired, 0);
}

#[tokio::test]
async fn login_does_not_reveal_which_part_was_wrong() {
    let h = harness();
    register(&h, "Employer", "employer").await;

    let wrong_password = h
        .services
        .auth
        .login(Some("employer@example.com"), Some("nope123"))
        .await
        .unwrap_err();
    let unknown_email = h
        .services
        .auth
        .login(Some("ghost@example.com"), Some("secret123"))
        .await
        .unwrap_err();
    assert_eq!(wrong_password, unknown_email);

    let session = h
        .services
        .auth
        .login(Some("  EMPLOYER@example.com "), Some("secret123"))
        .await
        .unwrap();
    let (principal, user) = h.services.auth.authenticate(&session.token).await.unwrap();
    assert!(principal.is_employer());
    assert_eq!(user.email, "employer@example.com");
}

#[tokio::test]
async fn duplicate_email_registration_is_a_conflict() {
    let h = harness();
    register(&h, "Employer", "employer").await;
    let err = h
        .services
        .auth
        .register(Some("Someone"), Some("Employer@Example.com"), Some("secret123"), Some("candidate"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
}

#[tokio::test]
async fn only_the_recipient_can_mark_a_notification_read() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    let notifications = h.services.notifications.clone();
    eventually(|| {
        let notifications = notifications.clone();
        async move { !notifications.list(&employer).await.unwrap().is_empty() }
    })
    .await;
    let id = h.services.notifications.list(&employer).await.unwrap()[0].id;

    assert!(matches!(
        h.services.notifications.mark_read(&candidate, id).await.unwrap_err(),
        ServiceError::Forbidden(_)
    ));
    assert!(h.services.notifications.mark_read(&employer, id).await.unwrap().read);
    assert!(h.services.notifications.mark_read(&employer, id).await.unwrap().read);
}

#[tokio::test]
async fn analytics_count_applications_per_job() {
    let h = harness();
    let employer = register(&h, "Employer", "employer").await;
    let alice = register(&h, "Alice", "candidate").await;
    let bob = register(&h, "Bob", "candidate").await;
    let first = post_job(&h, &employer, "Rust Engineer").await;
    post_job(&h, &employer, "Go Engineer").await;
    post_job(&h, &employer, "Ops Engineer").await;
    h.services.applications.apply(&alice, first.id, draft()).await.unwrap();
    h.services.applications.apply(&bob, first.id, draft()).await.unwrap();

    let summary = h.services.analytics.employer_summary(&employer).await.unwrap();
    assert_eq!(summary.total_jobs, 3);
    assert_eq!(summary.total_applicants, 2);
    assert_eq!(summary.conversion_rate, 66.67);

    assert!(matches!(
        h.services.analytics.employer_summary(&alice).await.unwrap_err(),
        ServiceError::Forbidden(_)
    ));
}

#[tokio::test]
async fn concurrent_withdraw_and_hire_cannot_both_succeed() {
    let mut stores = Stores::in_memory();
    stores.applications = Arc::new(SlowApplications(stores.applications.clone()));
    let h = harness_with_stores(stores);
    let employer = register(&h, "Employer", "employer").await;
    let candidate = register(&h, "Candidate", "candidate").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let application = h.services.applications.apply(&candidate, job.id, draft()).await.unwrap();

    let (withdrawn, hired) = tokio::join!(
        h.services.applications.withdraw(&candidate, application.id),
        h.services.applications.update_status(&employer, application.id, Some("Hired")),
    );

    let winner = match (withdrawn, hired) {
        (Ok(app), Err(err)) | (Err(err), Ok(app)) => {
            assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))), "{err:?}");
            app.status
        }
        (a, b) => panic!("expected exactly one winner, got {a:?} and {b:?}"),
    };
    let stored = h.stores.applications.get(application.id).await.unwrap().unwrap();
    assert_eq!(stored.status, winner);
}

async fn paid_order(h: &Harness, employer: &Principal, job: &Job) -> (String, String) {
    let created = h
        .services
        .payments
        .create_order(employer, Some(&json!(100.00)), Some("INR"), Some(&job.id.to_string()))
        .await
        .unwrap();
    (created.order.id, created.transaction_id.to_string())
}

#[tokio::test]
async fn concurrent_verifications_promote_once() {
    let mut stores = Stores::in_memory();
    let jobs = Arc::new(InstrumentedJobs::wrap(stores.jobs.clone()));
    stores.jobs = jobs.clone();
    stores.transactions = Arc::new(SlowTransactions(stores.transactions.clone()));
    let h = harness_with_stores(stores);
    let employer = register(&h, "Employer", "employer").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let (order_id, txn_id) = paid_order(&h, &employer, &job).await;

    let sig_1 = sign(PAYMENT_SECRET.as_bytes(), &order_id, "pay_1").unwrap();
    let sig_2 = sign(PAYMENT_SECRET.as_bytes(), &order_id, "pay_2").unwrap();
    let (first, second) = tokio::join!(
        h.services.payments.verify(
            None,
            VerifyRequest {
                order_id: Some(&order_id),
                payment_id: Some("pay_1"),
                signature: Some(&sig_1),
                transaction_id: Some(&txn_id),
            }
        ),
        h.services.payments.verify(
            None,
            VerifyRequest {
                order_id: Some(&order_id),
                payment_id: Some("pay_2"),
                signature: Some(&sig_2),
                transaction_id: Some(&txn_id),
            }
        ),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    let fresh: Vec<_> = [&first, &second].into_iter().filter(|v| !v.already_paid).collect();
    assert_eq!(fresh.len(), 1);
    let winner = fresh[0].transaction.provider_payment_id.clone();

    let stored = h
        .stores
        .transactions
        .get(first.transaction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.provider_payment_id, winner);
    assert_eq!(first.transaction.provider_payment_id, winner);
    assert_eq!(second.transaction.provider_payment_id, winner);
    assert_eq!(jobs.promotions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn owner_edit_racing_a_payment_keeps_the_job_premium() {
    let mut stores = Stores::in_memory();
    let mut jobs = InstrumentedJobs::wrap(stores.jobs.clone());
    jobs.get_delay = Duration::from_millis(50);
    stores.jobs = Arc::new(jobs);
    let h = harness_with_stores(stores);
    let employer = register(&h, "Employer", "employer").await;
    let job = post_job(&h, &employer, "Rust Engineer").await;
    let (order_id, txn_id) = paid_order(&h, &employer, &job).await;
    let signature = sign(PAYMENT_SECRET.as_bytes(), &order_id, "pay_1").unwrap();

    let (edited, verified) = tokio::join!(
        h.services.jobs.update(
            &employer,
            job.id,
            jobboard_jobs::JobPatch {
                title: Some("Senior Rust Engineer".into()),
                ..Default::default()
            },
        ),
        h.services.payments.verify(
            Some(&employer),
            VerifyRequest {
                order_id: Some(&order_id),
                payment_id: Some("pay_1"),
                signature: Some(&signature),
                transaction_id: Some(&txn_id),
            }
        ),
    );
    edited.unwrap();
    assert!(!verified.unwrap().already_paid);

    let stored = h.stores.jobs.get(job.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Senior Rust Engineer");
    assert!(stored.is_premium);
    assert!(stored.expires_at.is_some());
}

#[tokio::test]
async fn reconciler_keeps_going_past_a_failing_job() {
    let mut stores = Stores::in_memory();
    let jobs = Arc::new(InstrumentedJobs::wrap(stores.jobs.clone()));
    stores.jobs = jobs.clone();
    let h = harness_with_stores(stores);
    let employer = register(&h, "Employer", "employer").await;
    let broken = post_job(&h, &employer, "Broken").await;
    let healthy = post_job(&h, &employer, "Healthy").await;
    *jobs.broken.lock().unwrap() = Some(broken.id);

    let now = Utc::now();
    for (job, n) in [(&broken, 1), (&healthy, 2)] {
        let order = ProviderOrder {
            id: format!("order_{n}"),
            amount: 100,
            currency: "INR".into(),
            receipt: None,
            status: None,
            raw: json!({}),
        };
        let mut txn = Transaction::open(
            TransactionId::new(),
            employer.user_id,
            Some(job.id),
            jobboard_payments::Amount::from_minor(100).unwrap(),
            Default::default(),
            "razorpay",
            &order,
            now,
        );
        txn.mark_paid(&order.id, &format!("pay_{n}"), now).unwrap();
        h.stores.transactions.insert(txn).await.unwrap();
    }

    let report = h.services.reconciler.run_once(now).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.repaired, 1);
    assert_eq!(report.failed, 1);
    assert!(h.stores.jobs.get(healthy.id).await.unwrap().unwrap().is_premium);
    assert!(!h.stores.jobs.get(broken.id).await.unwrap().unwrap().is_premium);
}
