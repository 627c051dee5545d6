//! Applying, listing, employer status changes and candidate withdrawal.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use jobboard_applications::{Application, ApplicationDraft, StatusTarget};
use jobboard_auth::{Action, Principal, authorize};
use jobboard_core::{ApplicationId, DomainError, JobId, UserId};
use jobboard_jobs::Job;

use super::{ServiceError, ServiceResult};
use crate::notifier::Notifier;
use crate::store::{ApplicationStore, JobStore, StoreError, UserStore};

/// What a candidate sees about the job behind each of their applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRef {
    pub id: JobId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateApplicationView {
    #[serde(flatten)]
    pub application: Application,
    /// `None` when the job has since been removed.
    pub job: Option<JobSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployerApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub candidate: Option<CandidateSummary>,
    pub job: Option<JobRef>,
}

#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationStore>,
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserStore>,
    notifier: Notifier,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            applications,
            jobs,
            users,
            notifier,
        }
    }

    /// Apply to a job.
    ///
    /// Steps run in a fixed order: job lookup, pair check, insert, counter
    /// increment, then the employer notification on a spawned task. The pair
    /// check is a fast path; the store's uniqueness constraint is what stops
    /// a concurrent duplicate.
    #[instrument(skip(self, draft), fields(user_id = %principal.user_id, job_id = %job_id), err)]
    pub async fn apply(
        &self,
        principal: &Principal,
        job_id: JobId,
        draft: ApplicationDraft,
    ) -> ServiceResult<Application> {
        authorize(principal, &Action::Apply)?;

        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| DomainError::not_found("job"))?;

        if self
            .applications
            .find_by_pair(job.id, principal.user_id)
            .await?
            .is_some()
        {
            return Err(already_applied());
        }

        let application = Application::submit(
            ApplicationId::new(),
            job.id,
            principal.user_id,
            draft,
            Utc::now(),
        );
        match self.applications.insert(application.clone()).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(already_applied()),
            Err(other) => return Err(other.into()),
        }

        // The counter is an approximation; losing one increment must not
        // fail an application that is already stored.
        match self.jobs.increment_application_count(job.id).await {
            Ok(count) => info!(application_id = %application.id, application_count = count, "application submitted"),
            Err(err) => warn!(error = %err, application_id = %application.id, "application count increment failed"),
        }

        let notifier = self.notifier.clone();
        let submitted = application.clone();
        tokio::spawn(async move { notifier.application_submitted(submitted, job).await });

        Ok(application)
    }

    pub async fn list_mine(&self, principal: &Principal) -> ServiceResult<Vec<CandidateApplicationView>> {
        authorize(principal, &Action::ListOwnApplications)?;
        let applications = self.applications.list_by_candidate(principal.user_id).await?;
        let job_ids = unique(applications.iter().map(|a| a.job_id));
        let jobs: HashMap<JobId, Job> = self
            .jobs
            .get_many(&job_ids)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| CandidateApplicationView {
                job: jobs.get(&application.job_id).map(|j| JobSummary {
                    id: j.id,
                    title: j.title.clone(),
                    company: j.company.clone(),
                    location: j.location.clone(),
                    salary: j.salary.clone(),
                }),
                application,
            })
            .collect())
    }

    /// Applications to the caller's jobs, optionally narrowed to one of them.
    pub async fn list_for_employer(
        &self,
        principal: &Principal,
        job_id: Option<JobId>,
    ) -> ServiceResult<Vec<EmployerApplicationView>> {
        authorize(principal, &Action::ListEmployerApplications { job_owner: None })?;

        let jobs = match job_id {
            Some(id) => {
                let job = self
                    .jobs
                    .get(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("job"))?;
                authorize(
                    principal,
                    &Action::ListEmployerApplications {
                        job_owner: Some(job.posted_by),
                    },
                )?;
                vec![job]
            }
            None => self.jobs.list_by_owner(principal.user_id).await?,
        };
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let job_ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        let applications = self.applications.list_by_jobs(&job_ids).await?;
        let candidate_ids = unique(applications.iter().map(|a| a.candidate_id));
        let candidates: HashMap<UserId, CandidateSummary> = self
            .users
            .get_many(&candidate_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    CandidateSummary {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                    },
                )
            })
            .collect();
        let job_refs: HashMap<JobId, JobRef> = jobs
            .into_iter()
            .map(|j| (j.id, JobRef { id: j.id, title: j.title }))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| EmployerApplicationView {
                candidate: candidates.get(&application.candidate_id).cloned(),
                job: job_refs.get(&application.job_id).cloned(),
                application,
            })
            .collect())
    }

    /// Employer-driven forward move.
    ///
    /// A dangling job reference is an integrity failure, not a 404. Ownership
    /// is checked before the requested status is parsed.
    #[instrument(skip(self, raw_status), fields(user_id = %principal.user_id, application_id = %id), err)]
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: ApplicationId,
        raw_status: Option<&str>,
    ) -> ServiceResult<Application> {
        let mut application = self.load(id).await?;
        let job = match self.jobs.get(application.job_id).await? {
            Some(job) => job,
            None => {
                error!(
                    application_id = %application.id,
                    job_id = %application.job_id,
                    "application references a missing job"
                );
                return Err(ServiceError::integrity("application references a missing job"));
            }
        };
        authorize(principal, &Action::AdvanceApplication { job_owner: job.posted_by })?;

        let target = StatusTarget::parse(raw_status)?;
        if target.via_legacy_alias {
            warn!(application_id = %application.id, "deprecated status spelling \"Reviewed\" mapped to Shortlisted");
        }

        let read_status = application.status;
        application.advance(target.status, Utc::now())?;
        self.applications.update(application.clone(), read_status).await?;
        info!(application_id = %application.id, status = %application.status, "application status updated");

        let notifier = self.notifier.clone();
        let changed = application.clone();
        tokio::spawn(async move { notifier.status_changed(changed, job.title).await });

        Ok(application)
    }

    /// Candidate withdrawal. The job's applicant counter is left as is.
    #[instrument(skip(self), fields(user_id = %principal.user_id, application_id = %id), err)]
    pub async fn withdraw(&self, principal: &Principal, id: ApplicationId) -> ServiceResult<Application> {
        let mut application = self.load(id).await?;
        authorize(
            principal,
            &Action::WithdrawApplication {
                candidate: application.candidate_id,
            },
        )?;
        let read_status = application.status;
        application.withdraw(Utc::now())?;
        self.applications.update(application.clone(), read_status).await?;
        info!(application_id = %application.id, "application withdrawn");
        Ok(application)
    }

    async fn load(&self, id: ApplicationId) -> ServiceResult<Application> {
        self.applications
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("application").into())
    }
}

fn already_applied() -> ServiceError {
    DomainError::conflict("you have already applied to this job").into()
}

fn unique<T: Ord + Copy>(ids: impl Iterator<Item = T>) -> Vec<T> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}
