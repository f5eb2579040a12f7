use secrecy::Secret;

use crate::domain::email::Email;
use crate::domain::ids::{AccountId, ProviderId, UserId};

/// An at-rest password hash in PHC string format.
#[derive(Debug, Clone)]
pub struct PasswordHash(Secret<String>);

impl PasswordHash {
    pub fn new(phc: Secret<String>) -> Self {
        Self(phc)
    }

    pub fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// One credential record per (provider, user).
///
/// Invariant: `totp_secret` is present and non-empty iff
/// `authenticator_is_setup`. The only transition is unsetup -> setup,
/// performed through [`AuthAccount::enable_authenticator`], so a partial
/// state cannot be constructed outside of this module.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    account_id: AccountId,
    user_id: UserId,
    provider: ProviderId,
    email: Email,
    password_hash: PasswordHash,
    authenticator_is_setup: bool,
    totp_secret: Option<String>,
}

impl AuthAccount {
    /// A fresh account as created at sign-up: no authenticator yet.
    pub fn new(
        account_id: AccountId,
        user_id: UserId,
        provider: ProviderId,
        email: Email,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            account_id,
            user_id,
            provider,
            email,
            password_hash,
            authenticator_is_setup: false,
            totp_secret: None,
        }
    }

    /// Rebuild an account from storage.
    ///
    /// Returns `None` when the stored fields violate the setup/secret
    /// invariant, so a corrupt row is surfaced instead of propagated.
    pub fn from_parts(
        account_id: AccountId,
        user_id: UserId,
        provider: ProviderId,
        email: Email,
        password_hash: PasswordHash,
        authenticator_is_setup: bool,
        totp_secret: Option<String>,
    ) -> Option<Self> {
        let secret_present = totp_secret.as_deref().is_some_and(|s| !s.is_empty());
        if authenticator_is_setup != secret_present {
            return None;
        }
        Some(Self {
            account_id,
            user_id,
            provider,
            email,
            password_hash,
            authenticator_is_setup,
            totp_secret,
        })
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn authenticator_is_setup(&self) -> bool {
        self.authenticator_is_setup
    }

    pub fn totp_secret(&self) -> Option<&str> {
        self.totp_secret.as_deref()
    }

    /// Commit a proven TOTP secret: both fields flip together.
    pub fn enable_authenticator(&mut self, encoded_secret: String) {
        self.totp_secret = Some(encoded_secret);
        self.authenticator_is_setup = true;
    }
}
