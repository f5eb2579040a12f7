use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    account::{AuthAccount, PasswordHash},
    email::Email,
    ids::{AccountId, ProviderId, UserId},
    user::User,
};

// AccountStore port trait and errors
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("Account already exists")]
    AccountAlreadyExists,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for AccountStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AccountAlreadyExists, Self::AccountAlreadyExists) => true,
            (Self::AccountNotFound, Self::AccountNotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Persistence boundary for `User` and `AuthAccount` records.
///
/// Lookups are exact-match and case-sensitive; absent records come back
/// as `Ok(None)`, not as errors. Implementations must keep
/// `create_user_and_account` atomic (a user is never persisted without
/// its account, and the (provider, email) pair is unique - the loser of
/// a duplicate race observes `AccountAlreadyExists`) and must apply
/// `set_totp_secret` as a single write of both the secret and the setup
/// flag.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, AccountStoreError>;

    async fn find_account_by_provider_and_email(
        &self,
        provider: &ProviderId,
        email: &Email,
    ) -> Result<Option<AuthAccount>, AccountStoreError>;

    async fn find_account_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthAccount>, AccountStoreError>;

    async fn create_user_and_account(
        &self,
        provider: &ProviderId,
        email: Email,
        password_hash: PasswordHash,
    ) -> Result<(User, AuthAccount), AccountStoreError>;

    async fn set_totp_secret(
        &self,
        account_id: &AccountId,
        encoded_secret: String,
    ) -> Result<(), AccountStoreError>;
}
