//! # Warden - Email/Password + TOTP Authentication Service Library
//!
//! This is a facade crate that re-exports all public APIs from the warden
//! service components. Use this crate to get access to the whole
//! credential-and-MFA stack in one place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! warden = { path = "../warden" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `AuthAccount`, etc.
//! - **Repository trait**: `AccountStore`
//! - **Use cases**: `AuthorizeUseCase`, `ProvisionMfaUseCase`
//! - **Adapters**: `HashMapAccountStore`, `PostgresAccountStore`, config
//! - **HTTP surface**: axum routes for the logical RPCs
//! - **Client**: `FlowController` - the multi-round sign-in driver
//! - **Service**: `AuthService` - the composition root

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use warden_core::*;
}

// Re-export most commonly used core types at the root level
pub use warden_core::{
    AccountId, AuthAccount, AuthErrorCode, AuthenticationAttempt, Email, Flow, OtpCode, Password,
    PasswordHash, ProviderId, SessionPrincipal, User, UserId,
};

// ============================================================================
// Repository Trait (Port)
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use warden_core::{AccountStore, AccountStoreError};
}

// Re-export repository trait at root level
pub use warden_core::{AccountStore, AccountStoreError};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use warden_application::*;
}

// Re-export use cases at root level
pub use warden_application::{
    AuthorizeError, AuthorizeUseCase, PendingProvisioning, ProvisionError, ProvisionMfaUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use warden_adapters::persistence::*;
    }

    /// Configuration
    pub mod config {
        pub use warden_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use warden_adapters::persistence::{HashMapAccountStore, PostgresAccountStore};

// ============================================================================
// HTTP Surface
// ============================================================================

/// Axum route handlers for the logical RPCs
pub mod http_routes {
    pub use warden_axum::*;
}

// ============================================================================
// Client Flow Controller
// ============================================================================

/// Client-side protocol driver
pub mod client {
    pub use warden_client::*;
}

// Re-export the controller at root level
pub use warden_client::{AuthApi, FlowController, FlowState, HttpAuthApi, MfaStage};

// ============================================================================
// Auth Service (Main Entry Point)
// ============================================================================

/// Main auth service
pub use warden_auth_service::{AuthService, configure_postgresql, get_postgres_pool, init_tracing};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the repository trait
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
