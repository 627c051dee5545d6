//! Job postings: creation, owner patches, premium promotion and list filters.

pub mod filter;
pub mod job;

pub use filter::JobFilter;
pub use job::{Job, JobDraft, JobPatch, PREMIUM_DURATION_DAYS};
