//! Input validation for request payloads.
//!
//! Derive-level rules live on the DTOs; the custom rules shared between
//! payloads live in [`rules`].

pub mod rules;

pub use validator::Validate;
