//! Client-side driver for the warden authentication protocol.
//!
//! The server signals flow redirections (`MFA_NOT_SETUP`, `MISSING_OTP`)
//! through structured error codes; [`FlowController`] interprets those
//! signals and walks a user through sign-in, forced MFA setup and OTP
//! verification. The transport is abstracted behind [`AuthApi`] so the
//! controller is testable without a server.

pub mod api;
pub mod flow_controller;
pub mod http_api;

// Re-export for convenience
pub use api::{ApiError, AuthApi, PendingTotp};
pub use flow_controller::{FlowController, FlowState, MfaStage};
pub use http_api::HttpAuthApi;
