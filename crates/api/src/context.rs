use jobboard_auth::{Principal, Role};
use jobboard_core::UserId;

/// Authenticated caller for a request.
///
/// Always built from the stored user, so the role is the current one even if
/// the token was issued earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    name: String,
}

impl PrincipalContext {
    pub fn new(principal: Principal, name: impl Into<String>) -> Self {
        Self {
            principal,
            name: name.into(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
