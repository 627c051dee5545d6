//! Registration, login and bearer-token resolution.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument};

use jobboard_auth::{
    AuthenticationError, Hs256TokenCodec, NewUser, Principal, PublicUser, User, hash_password,
    normalize_email, verify_password,
};
use jobboard_core::{DomainError, UserId};

use super::{ServiceError, ServiceResult};
use crate::notifier::Notifier;
use crate::store::UserStore;

/// A freshly authenticated user and the token they should present.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Hs256TokenCodec,
    notifier: Notifier,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Hs256TokenCodec, notifier: Notifier) -> Self {
        Self {
            users,
            tokens,
            notifier,
        }
    }

    #[instrument(skip_all, err)]
    pub async fn register(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        role: Option<&str>,
    ) -> ServiceResult<AuthSession> {
        let new_user = NewUser::validate(name, email, password, role)?;
        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(DomainError::conflict("user already exists").into());
        }

        // Argon2 is deliberately slow; keep it off the async workers.
        let plain = new_user.password.clone();
        let hash = tokio::task::spawn_blocking(move || hash_password(&plain)).await??;

        let now = Utc::now();
        let user = new_user.into_user(UserId::new(), hash, now);
        self.users.insert(user.clone()).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");

        let token = self.tokens.issue(user.id, user.role, now)?;
        let session = AuthSession {
            user: user.to_public(),
            token,
        };

        let notifier = self.notifier.clone();
        tokio::spawn(async move { notifier.welcome(user).await });

        Ok(session)
    }

    /// Unknown email and wrong password are reported identically.
    #[instrument(skip_all, err)]
    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> ServiceResult<AuthSession> {
        let email = normalize_email(email.unwrap_or_default());
        let password = password.unwrap_or_default().to_string();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::validation("email and password are required").into());
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthenticationError::InvalidCredentials)?;

        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await?
            .map_err(|err| {
                error!(user_id = %user.id, error = %err, "stored password hash is unreadable");
                ServiceError::from(err)
            })?;
        if !matches {
            return Err(AuthenticationError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(user.id, user.role, Utc::now())?;
        Ok(AuthSession {
            user: user.to_public(),
            token,
        })
    }

    /// Resolve a bearer token to the stored user behind it.
    ///
    /// The role comes from storage, not from the token.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<(Principal, User)> {
        let claims = self.tokens.validate(token, Utc::now())?;
        let user = self
            .users
            .get(claims.sub)
            .await?
            .ok_or(AuthenticationError::UnknownIdentity)?;
        Ok((Principal::new(user.id, user.role), user))
    }

    pub fn token_codec(&self) -> &Hs256TokenCodec {
        &self.tokens
    }
}
