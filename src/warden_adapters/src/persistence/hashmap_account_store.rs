use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use warden_core::{
    AccountId, AccountStore, AccountStoreError, AuthAccount, Email, PasswordHash, ProviderId,
    User, UserId,
};

/// In-memory account store for tests and local development.
///
/// The write lock makes check-then-insert atomic, so the uniqueness
/// behavior matches the Postgres adapter: of two racing creates for the
/// same email, exactly one wins.
#[derive(Default, Clone)]
pub struct HashMapAccountStore {
    records: Arc<RwLock<HashMap<Email, (User, AuthAccount)>>>,
}

impl HashMapAccountStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl AccountStore for HashMapAccountStore {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, AccountStoreError> {
        let records = self.records.read().await;
        Ok(records.get(email).map(|(user, _)| user.clone()))
    }

    async fn find_account_by_provider_and_email(
        &self,
        provider: &ProviderId,
        email: &Email,
    ) -> Result<Option<AuthAccount>, AccountStoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(email)
            .filter(|(_, account)| account.provider() == provider)
            .map(|(_, account)| account.clone()))
    }

    async fn find_account_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthAccount>, AccountStoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|(user, _)| user.user_id() == user_id)
            .map(|(_, account)| account.clone()))
    }

    async fn create_user_and_account(
        &self,
        provider: &ProviderId,
        email: Email,
        password_hash: PasswordHash,
    ) -> Result<(User, AuthAccount), AccountStoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&email) {
            return Err(AccountStoreError::AccountAlreadyExists);
        }

        let user = User::new(UserId::new(), email.clone());
        let account = AuthAccount::new(
            AccountId::new(),
            *user.user_id(),
            provider.clone(),
            email.clone(),
            password_hash,
        );
        records.insert(email, (user.clone(), account.clone()));
        Ok((user, account))
    }

    async fn set_totp_secret(
        &self,
        account_id: &AccountId,
        encoded_secret: String,
    ) -> Result<(), AccountStoreError> {
        let mut records = self.records.write().await;
        let entry = records
            .values_mut()
            .find(|(_, account)| account.account_id() == account_id)
            .ok_or(AccountStoreError::AccountNotFound)?;
        entry.1.enable_authenticator(encoded_secret);
        Ok(())
    }
}
