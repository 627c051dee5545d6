use core::str::FromStr;

use serde::{Deserialize, Serialize};

use jobboard_core::DomainError;

/// The two mutually exclusive roles a user can hold.
///
/// Roles are capability tags, not a hierarchy: an employer cannot act as a
/// candidate and vice versa.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "candidate" => Ok(Role::Candidate),
            "employer" => Ok(Role::Employer),
            _ => Err(DomainError::validation("role must be candidate or employer")),
        }
    }
}
