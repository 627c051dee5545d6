use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use jobboard_auth::{Action, Principal, authorize};
use jobboard_core::JobId;

use super::ServiceResult;
use crate::store::{ApplicationStore, JobStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicants {
    pub job_id: JobId,
    pub title: String,
    pub applicants: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerAnalytics {
    pub total_jobs: u64,
    pub total_applicants: u64,
    /// Applicants per job as a percentage, rounded to two decimals.
    pub conversion_rate: f64,
    pub per_job: Vec<JobApplicants>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    jobs: Arc<dyn JobStore>,
    applications: Arc<dyn ApplicationStore>,
}

impl AnalyticsService {
    pub fn new(jobs: Arc<dyn JobStore>, applications: Arc<dyn ApplicationStore>) -> Self {
        Self { jobs, applications }
    }

    /// Counts come from the application records, not the denormalized
    /// counter on the job.
    pub async fn employer_summary(&self, principal: &Principal) -> ServiceResult<EmployerAnalytics> {
        authorize(principal, &Action::ViewAnalytics)?;
        let jobs = self.jobs.list_by_owner(principal.user_id).await?;
        if jobs.is_empty() {
            return Ok(EmployerAnalytics {
                total_jobs: 0,
                total_applicants: 0,
                conversion_rate: 0.0,
                per_job: Vec::new(),
            });
        }

        let ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        let mut counts: HashMap<JobId, u64> = HashMap::new();
        for application in self.applications.list_by_jobs(&ids).await? {
            *counts.entry(application.job_id).or_default() += 1;
        }

        let per_job: Vec<JobApplicants> = jobs
            .into_iter()
            .map(|job| JobApplicants {
                applicants: counts.get(&job.id).copied().unwrap_or(0),
                job_id: job.id,
                title: job.title,
            })
            .collect();
        let total_jobs = per_job.len() as u64;
        let total_applicants: u64 = per_job.iter().map(|j| j.applicants).sum();

        Ok(EmployerAnalytics {
            total_jobs,
            total_applicants,
            conversion_rate: conversion_rate(total_applicants, total_jobs),
            per_job,
        })
    }
}

fn conversion_rate(applicants: u64, jobs: u64) -> f64 {
    if jobs == 0 {
        return 0.0;
    }
    let pct = applicants as f64 / jobs as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
