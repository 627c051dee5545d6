use core::str::FromStr;

use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult};

/// Canonical application status set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Interviewed,
    Rejected,
    Hired,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interviewed,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Interviewed => "Interviewed",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// Position in the employer pipeline. Both outcomes share the last rank.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            ApplicationStatus::Applied => 0,
            ApplicationStatus::Shortlisted => 1,
            ApplicationStatus::Interviewed => 2,
            ApplicationStatus::Rejected | ApplicationStatus::Hired | ApplicationStatus::Withdrawn => 3,
        }
    }

    /// Whether an employer may name this status as a target.
    pub fn is_employer_target(&self) -> bool {
        !matches!(self, ApplicationStatus::Applied | ApplicationStatus::Withdrawn)
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("invalid status value: {}", s.trim())))
    }
}

/// A parsed employer target status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusTarget {
    pub status: ApplicationStatus,
    /// Set when the request used the legacy `Reviewed` spelling.
    pub via_legacy_alias: bool,
}

impl StatusTarget {
    /// Parse and validate a status an employer wants to move an application to.
    ///
    /// Unknown values, `Applied`, `Withdrawn` and the legacy `Pending` are
    /// rejected before anything is written. `Reviewed` maps to `Shortlisted`.
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(DomainError::validation("status is required"));
        }
        if raw == "Reviewed" {
            return Ok(Self {
                status: ApplicationStatus::Shortlisted,
                via_legacy_alias: true,
            });
        }
        let status: ApplicationStatus = raw.parse()?;
        if !status.is_employer_target() {
            return Err(DomainError::validation(format!(
                "invalid status value: {status} cannot be set by an employer"
            )));
        }
        Ok(Self {
            status,
            via_legacy_alias: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        let terminal: Vec<_> = ApplicationStatus::ALL
            .into_iter()
            .filter(ApplicationStatus::is_terminal)
            .collect();
        assert_eq!(
            terminal,
            vec![
                ApplicationStatus::Rejected,
                ApplicationStatus::Hired,
                ApplicationStatus::Withdrawn
            ]
        );
    }

    #[test]
    fn reviewed_is_an_alias_for_shortlisted() {
        let target = StatusTarget::parse(Some("Reviewed")).unwrap();
        assert_eq!(target.status, ApplicationStatus::Shortlisted);
        assert!(target.via_legacy_alias);
        assert!(!StatusTarget::parse(Some("Shortlisted")).unwrap().via_legacy_alias);
    }

    #[test]
    fn rejects_unknown_and_non_employer_targets() {
        for raw in ["Pending", "hired", "Applied", "Withdrawn", "", "Promoted"] {
            assert!(
                matches!(StatusTarget::parse(Some(raw)), Err(DomainError::Validation(_))),
                "{raw} should be rejected"
            );
        }
        assert!(StatusTarget::parse(None).is_err());
    }

    #[test]
    fn serializes_as_variant_name() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Interviewed).unwrap(),
            "\"Interviewed\""
        );
    }
}
