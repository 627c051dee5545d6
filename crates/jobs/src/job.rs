use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult, Entity, JobId, UserId};

/// How long a paid promotion keeps a job premium.
pub const PREMIUM_DURATION_DAYS: i64 = 30;

/// A job posting.
///
/// `posted_by` is stamped at creation from the authenticated employer and is
/// never reassigned. `is_premium`/`expires_at` change only through
/// [`Job::promote`]; `application_count` only through the store's atomic
/// increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub experience_level: Option<String>,
    pub perks: Vec<String>,
    pub posted_by: UserId,
    pub is_premium: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub application_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Entity for Job {
    type Id = JobId;

    fn id(&self) -> JobId {
        self.id
    }
}

/// Client-supplied fields for a new job. There is deliberately no owner,
/// premium or counter field here: those are server-controlled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub experience_level: Option<String>,
    #[serde(default)]
    pub perks: Vec<String>,
}

/// Owner-supplied partial update. Only the listed fields can change; anything
/// else in the request body (including `postedBy`) is dropped at
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub experience_level: Option<String>,
    pub perks: Option<Vec<String>>,
}

fn required(field: &str, value: Option<&str>) -> DomainResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

fn clean_perks(perks: Vec<String>) -> Vec<String> {
    perks
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

impl Job {
    /// Build a new, non-premium job owned by `owner`.
    pub fn create(id: JobId, owner: UserId, draft: JobDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            title: required("title", draft.title.as_deref())?,
            company: required("company", draft.company.as_deref())?,
            location: required("location", draft.location.as_deref())?,
            salary: draft.salary,
            description: draft.description,
            category: draft.category,
            experience_level: draft.experience_level,
            perks: clean_perks(draft.perks),
            posted_by: owner,
            is_premium: false,
            expires_at: None,
            application_count: 0,
            created_at: now,
        })
    }

    /// Merge an owner patch. Required fields may change but not be blanked.
    /// Validation happens before any field is touched.
    pub fn apply_patch(&mut self, patch: JobPatch) -> DomainResult<()> {
        let title = patch.title.as_deref().map(|v| required("title", Some(v))).transpose()?;
        let company = patch.company.as_deref().map(|v| required("company", Some(v))).transpose()?;
        let location = patch.location.as_deref().map(|v| required("location", Some(v))).transpose()?;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = company {
            self.company = v;
        }
        if let Some(v) = location {
            self.location = v;
        }
        if patch.salary.is_some() {
            self.salary = patch.salary;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
        if patch.category.is_some() {
            self.category = patch.category;
        }
        if patch.experience_level.is_some() {
            self.experience_level = patch.experience_level;
        }
        if let Some(perks) = patch.perks {
            self.perks = clean_perks(perks);
        }
        Ok(())
    }

    /// End of a premium window that starts at `now`.
    pub fn premium_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(PREMIUM_DURATION_DAYS)
    }

    /// Flag as premium for [`PREMIUM_DURATION_DAYS`] from `now`.
    ///
    /// Promoting an already-premium job restarts the window from `now`.
    pub fn promote(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires_at = Self::premium_expiry(now);
        self.is_premium = true;
        self.expires_at = Some(expires_at);
        expires_at
    }
}
