//! Axum surface for the warden authentication service.
//!
//! Exposes the logical RPCs - `authorize`, `beginProvisioning`,
//! `commitProvisioning` - as JSON-over-HTTP routes. Failure bodies
//! always carry a machine-readable `code` next to the human `error`
//! message, so clients never have to parse message text.

pub mod routes;

// Re-export for convenience
pub use routes::{AuthState, authorize, begin_mfa, commit_mfa};
