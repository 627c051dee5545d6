//! `jobboard-auth`: identity, bearer tokens and the authorization policy.
//!
//! This crate is intentionally decoupled from HTTP and storage. Every policy
//! decision is a pure function of the principal and the stored ownership of
//! the target resource.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{Action, AuthzError, authorize};
pub use claims::{AuthenticationError, JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{DEFAULT_TOKEN_TTL_SECS, Hs256TokenCodec, parse_ttl};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use roles::Role;
pub use user::{NewUser, PublicUser, User, normalize_email};
