//! Job postings: create, list, read, owner update and cascading delete.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument};

use jobboard_auth::{Action, Principal, User, authorize};
use jobboard_core::{DomainError, JobId, Page, PageRequest, UserId};
use jobboard_jobs::{Job, JobDraft, JobFilter, JobPatch};

use super::{ServiceError, ServiceResult};
use crate::notifier::Notifier;
use crate::store::{CascadeOutcome, JobCascade, JobStore, UserStore};

/// Public summary of the employer behind a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosterSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for PosterSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub poster: Option<PosterSummary>,
}

#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserStore>,
    cascade: Arc<dyn JobCascade>,
    notifier: Notifier,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserStore>,
        cascade: Arc<dyn JobCascade>,
        notifier: Notifier,
    ) -> Self {
        Self {
            jobs,
            users,
            cascade,
            notifier,
        }
    }

    /// The owner is always the caller; premium fields start cleared.
    #[instrument(skip(self, draft), fields(user_id = %principal.user_id), err)]
    pub async fn create(&self, principal: &Principal, draft: JobDraft) -> ServiceResult<Job> {
        authorize(principal, &Action::CreateJob)?;
        let job = Job::create(JobId::new(), principal.user_id, draft, Utc::now())?;
        self.jobs.insert(job.clone()).await?;
        info!(job_id = %job.id, "job posted");
        self.notifier.job_posted(&job);
        Ok(job)
    }

    pub async fn list(&self, filter: &JobFilter, page: PageRequest) -> ServiceResult<Page<JobView>> {
        let (jobs, total) = self.jobs.list(filter, page).await?;
        let posters = self.posters(&jobs).await?;
        let views = jobs
            .into_iter()
            .map(|job| JobView {
                poster: posters.get(&job.posted_by).cloned(),
                job,
            })
            .collect();
        Ok(Page::new(views, total, page))
    }

    pub async fn get(&self, id: JobId) -> ServiceResult<JobView> {
        let job = self.load(id).await?;
        let poster = self.users.get(job.posted_by).await?.as_ref().map(PosterSummary::from);
        Ok(JobView { job, poster })
    }

    /// Ownership is checked against the stored job before the patch is looked at.
    #[instrument(skip(self, patch), fields(user_id = %principal.user_id, job_id = %id), err)]
    pub async fn update(&self, principal: &Principal, id: JobId, patch: JobPatch) -> ServiceResult<Job> {
        let mut job = self.load(id).await?;
        authorize(principal, &Action::MutateJob { owner: job.posted_by })?;
        job.apply_patch(patch)?;
        self.jobs.update(job.clone()).await?;
        Ok(job)
    }

    #[instrument(skip(self), fields(user_id = %principal.user_id, job_id = %id), err)]
    pub async fn delete(&self, principal: &Principal, id: JobId) -> ServiceResult<CascadeOutcome> {
        let job = self.load(id).await?;
        authorize(principal, &Action::MutateJob { owner: job.posted_by })?;

        let outcome = self.cascade.delete_job_cascade(id).await?;
        if !outcome.job_removed {
            error!(job_id = %id, "job vanished between authorization and delete");
            return Err(ServiceError::integrity("job disappeared during delete"));
        }
        info!(job_id = %id, applications_removed = outcome.applications_removed, "job deleted");
        Ok(outcome)
    }

    async fn load(&self, id: JobId) -> ServiceResult<Job> {
        self.jobs
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("job").into())
    }

    async fn posters(&self, jobs: &[Job]) -> ServiceResult<HashMap<UserId, PosterSummary>> {
        let ids: Vec<UserId> = jobs
            .iter()
            .map(|j| j.posted_by)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.users.get_many(&ids).await?;
        Ok(users.iter().map(|u| (u.id, PosterSummary::from(u))).collect())
    }
}
