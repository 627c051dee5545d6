//! Job applications and their status state machine.
//!
//! ```text
//! Applied ──► Shortlisted ──► Interviewed ──► Hired | Rejected
//!    │             │               │
//!    └─────────────┴───────────────┴──► Withdrawn   (candidate only)
//! ```
//!
//! `Hired`, `Rejected` and `Withdrawn` are terminal.

pub mod application;
pub mod status;

pub use application::{Application, ApplicationDraft, TransitionError};
pub use status::{ApplicationStatus, StatusTarget};
