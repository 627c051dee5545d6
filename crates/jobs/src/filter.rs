use crate::Job;

/// Optional, independently combinable list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Case-insensitive substring of the title (stored lower-cased).
    pub q: Option<String>,
    /// Case-insensitive substring of the location (stored lower-cased).
    pub location: Option<String>,
    /// Exact match.
    pub category: Option<String>,
    /// Exact match.
    pub experience_level: Option<String>,
    pub is_premium: Option<bool>,
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.trim().is_empty())
}

impl JobFilter {
    /// Build a filter from raw query values. Empty values are ignored, and
    /// `is_premium` is honoured only for a literal `true`/`false`.
    pub fn from_query(
        q: Option<&str>,
        location: Option<&str>,
        category: Option<&str>,
        experience_level: Option<&str>,
        is_premium: Option<&str>,
    ) -> Self {
        Self {
            q: non_empty(q).map(|v| v.trim().to_lowercase()),
            location: non_empty(location).map(|v| v.trim().to_lowercase()),
            category: non_empty(category).map(str::to_string),
            experience_level: non_empty(experience_level).map(str::to_string),
            is_premium: is_premium.and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }),
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(q) = &self.q {
            if !job.title.to_lowercase().contains(q) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(location) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if job.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(level) = &self.experience_level {
            if job.experience_level.as_deref() != Some(level.as_str()) {
                return false;
            }
        }
        if let Some(premium) = self.is_premium {
            if job.is_premium != premium {
                return false;
            }
        }
        true
    }
}
