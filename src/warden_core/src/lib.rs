pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{AuthAccount, PasswordHash},
    attempt::AuthenticationAttempt,
    email::Email,
    error_code::AuthErrorCode,
    flow::{Flow, UnsupportedFlowError},
    ids::{AccountId, ProviderId, UserId},
    otp_code::OtpCode,
    password::Password,
    session::SessionPrincipal,
    user::User,
};

pub use ports::account_store::{AccountStore, AccountStoreError};
