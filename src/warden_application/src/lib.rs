pub mod crypto;
pub mod use_cases;

// Re-export commonly used types for convenience
pub use use_cases::{
    authorize::{AuthorizeError, AuthorizeUseCase},
    provision_mfa::{PendingProvisioning, ProvisionError, ProvisionMfaUseCase},
};
