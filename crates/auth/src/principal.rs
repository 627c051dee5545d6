use serde::{Deserialize, Serialize};

use jobboard_core::UserId;

use crate::Role;

/// A resolved, authenticated identity.
///
/// Only ever built from a verified token whose subject still exists in the
/// user store; request bodies never contribute to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }

    pub fn is_candidate(&self) -> bool {
        self.role == Role::Candidate
    }
}
