//! Registered users and registration-time validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// A stored user. `role` is fixed at registration and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Lower-cased, trimmed; unique across the store.
    pub email: String,
    /// Argon2 PHC string. Never serialized to clients (see [`PublicUser`]).
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// The client-visible projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A validated registration request (password still in clear text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    /// Validate raw registration input. Fails before any write happens.
    pub fn validate(
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        role: Option<&str>,
    ) -> DomainResult<Self> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let len = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
            return Err(DomainError::validation(format!(
                "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
            )));
        }

        let email = normalize_email(email.unwrap_or_default());
        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if !looks_like_email(&email) {
            return Err(DomainError::validation("a valid email address is required"));
        }

        let password = password.unwrap_or_default();
        if password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        if password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(DomainError::validation(format!(
                "password must be at least {PASSWORD_MIN_CHARS} characters long"
            )));
        }

        let role = match role.map(str::trim) {
            None | Some("") => return Err(DomainError::validation("role is required")),
            Some(raw) => raw.parse::<Role>()?,
        };

        Ok(Self {
            name: name.to_string(),
            email,
            password: password.to_string(),
            role,
        })
    }

    pub fn into_user(self, id: UserId, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
            created_at: now,
        }
    }
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && !domain.starts_with('.') && !domain.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DomainResult<NewUser> {
        NewUser::validate(
            Some("  Ada Lovelace "),
            Some(" Ada@Example.COM "),
            Some("secret1"),
            Some("candidate"),
        )
    }

    #[test]
    fn normalizes_name_and_email() {
        let user = valid().unwrap();
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Candidate);
    }

    #[test]
    fn rejects_short_name_bad_email_short_password_and_unknown_role() {
        let cases = [
            (Some("Al"), Some("a@b.io"), Some("secret1"), Some("candidate")),
            (Some("Alice"), Some("not-an-email"), Some("secret1"), Some("candidate")),
            (Some("Alice"), Some("a@b.io"), Some("12345"), Some("candidate")),
            (Some("Alice"), Some("a@b.io"), Some("secret1"), Some("admin")),
            (Some("Alice"), Some("a@b.io"), Some("secret1"), None),
        ];
        for (name, email, password, role) in cases {
            let err = NewUser::validate(name, email, password, role).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{err:?}");
        }
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("x@y.co"));
        assert!(!looks_like_email("x@y"));
        assert!(!looks_like_email("@y.co"));
        assert!(!looks_like_email("x@@y.co"));
        assert!(!looks_like_email("x y@z.co"));
    }

    #[test]
    fn public_projection_drops_the_hash() {
        let user = valid()
            .unwrap()
            .into_user(UserId::new(), "$argon2id$stub".into(), Utc::now());
        let json = serde_json::to_value(user.to_public()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "candidate");
    }
}
