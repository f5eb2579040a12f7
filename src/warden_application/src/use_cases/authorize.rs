use warden_core::{
    AccountStore, AccountStoreError, AuthErrorCode, AuthenticationAttempt, Flow, SessionPrincipal,
};

use crate::crypto::{password, totp};

/// Error types specific to the authorize use case.
///
/// Every variant carries a stable [`AuthErrorCode`] so callers dispatch
/// on structure, never on message text. `MfaNotSetup` and `MissingOtp`
/// are flow redirections rather than true failures: the client reacts to
/// them by starting provisioning or prompting for an OTP.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum AuthorizeError {
    #[error("Email already exists")]
    EmailAlreadyExists,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("MFA is not setup")]
    MfaNotSetup,
    #[error("Missing OTP")]
    MissingOtp,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("Missing email or password")]
    MissingCredential,
    #[error("Unsupported flow `{0}`")]
    UnsupportedFlow(String),
    #[error("Something went wrong, please try again")]
    Unexpected(String),
}

impl AuthorizeError {
    pub fn code(&self) -> AuthErrorCode {
        match self {
            AuthorizeError::EmailAlreadyExists => AuthErrorCode::EmailAlreadyExists,
            AuthorizeError::InvalidPassword => AuthErrorCode::InvalidPassword,
            AuthorizeError::InvalidCredentials => AuthErrorCode::InvalidCredentials,
            AuthorizeError::MfaNotSetup => AuthErrorCode::MfaNotSetup,
            AuthorizeError::MissingOtp => AuthErrorCode::MissingOtp,
            AuthorizeError::InvalidOtp => AuthErrorCode::InvalidOtp,
            AuthorizeError::MissingCredential => AuthErrorCode::MissingCredential,
            AuthorizeError::UnsupportedFlow(_) => AuthErrorCode::UnsupportedFlow,
            AuthorizeError::Unexpected(_) => AuthErrorCode::Internal,
        }
    }
}

/// Credential Authority - the server-side authorization decision point.
///
/// The provider tag and the store are injected at construction; nothing
/// is registered globally.
pub struct AuthorizeUseCase<S>
where
    S: AccountStore,
{
    account_store: S,
    provider: warden_core::ProviderId,
}

impl<S> AuthorizeUseCase<S>
where
    S: AccountStore,
{
    pub fn new(account_store: S, provider: warden_core::ProviderId) -> Self {
        Self {
            account_store,
            provider,
        }
    }

    /// Execute one authorization attempt.
    ///
    /// # Returns
    /// The session principal on a fully verified sign-in. Sign-up never
    /// returns a session: it terminates with `MfaNotSetup` so the caller
    /// routes through MFA provisioning.
    #[tracing::instrument(
        name = "AuthorizeUseCase::execute",
        skip_all,
        fields(flow = %attempt.flow)
    )]
    pub async fn execute(
        &self,
        attempt: AuthenticationAttempt,
    ) -> Result<SessionPrincipal, AuthorizeError> {
        match attempt.flow {
            Flow::SignUp => self.sign_up(attempt).await,
            Flow::SignIn => self.sign_in(attempt).await,
        }
    }

    async fn sign_up(
        &self,
        attempt: AuthenticationAttempt,
    ) -> Result<SessionPrincipal, AuthorizeError> {
        let existing = self
            .account_store
            .find_account_by_provider_and_email(&self.provider, &attempt.email)
            .await
            .map_err(store_failure)?;
        if existing.is_some() {
            return Err(AuthorizeError::EmailAlreadyExists);
        }

        if !attempt.password.meets_signup_policy() {
            return Err(AuthorizeError::InvalidPassword);
        }

        let password_hash = password::compute_password_hash(attempt.password)
            .await
            .map_err(AuthorizeError::Unexpected)?;

        match self
            .account_store
            .create_user_and_account(&self.provider, attempt.email, password_hash)
            .await
        {
            Ok(_) => {}
            // Lost a concurrent sign-up race for the same email.
            Err(AccountStoreError::AccountAlreadyExists) => {
                return Err(AuthorizeError::EmailAlreadyExists);
            }
            Err(e) => return Err(store_failure(e)),
        }

        // Sign-up is never directly "logged in"; it always routes through
        // MFA provisioning.
        Err(AuthorizeError::MfaNotSetup)
    }

    async fn sign_in(
        &self,
        attempt: AuthenticationAttempt,
    ) -> Result<SessionPrincipal, AuthorizeError> {
        let account = self
            .account_store
            .find_account_by_provider_and_email(&self.provider, &attempt.email)
            .await
            .map_err(store_failure)?;

        // Unknown account and wrong password fail identically so the
        // response cannot be used to enumerate emails.
        let Some(account) = account else {
            return Err(AuthorizeError::InvalidCredentials);
        };
        let verified =
            password::verify_password_hash(account.password_hash().clone(), attempt.password).await;
        if !verified {
            return Err(AuthorizeError::InvalidCredentials);
        }

        if !account.authenticator_is_setup() {
            return Err(AuthorizeError::MfaNotSetup);
        }

        let Some(otp) = attempt.otp else {
            return Err(AuthorizeError::MissingOtp);
        };

        let encoded = account.totp_secret().ok_or_else(|| {
            AuthorizeError::Unexpected("account is setup but has no stored secret".to_string())
        })?;
        let secret = totp::decode_secret(encoded)
            .map_err(|e| AuthorizeError::Unexpected(e.to_string()))?;

        if !totp::verify(&secret, otp.as_str()) {
            return Err(AuthorizeError::InvalidOtp);
        }

        Ok(SessionPrincipal::new(*account.user_id()))
    }
}

fn store_failure(error: AccountStoreError) -> AuthorizeError {
    tracing::error!(%error, "account store failure during authorize");
    AuthorizeError::Unexpected(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use warden_core::{
        AccountId, AuthAccount, Email, OtpCode, Password, PasswordHash, ProviderId, User, UserId,
    };

    use crate::crypto::{password as pw, totp};

    // In-memory store mirroring the uniqueness constraint of the real
    // adapters.
    #[derive(Clone, Default)]
    struct MockAccountStore {
        accounts: Arc<RwLock<HashMap<String, (User, AuthAccount)>>>,
    }

    #[async_trait::async_trait]
    impl AccountStore for MockAccountStore {
        async fn find_user_by_email(
            &self,
            email: &Email,
        ) -> Result<Option<User>, AccountStoreError> {
            let accounts = self.accounts.read().await;
            Ok(accounts
                .get(secrecy::ExposeSecret::expose_secret(email.as_ref()))
                .map(|(user, _)| user.clone()))
        }

        async fn find_account_by_provider_and_email(
            &self,
            _provider: &ProviderId,
            email: &Email,
        ) -> Result<Option<AuthAccount>, AccountStoreError> {
            let accounts = self.accounts.read().await;
            Ok(accounts
                .get(secrecy::ExposeSecret::expose_secret(email.as_ref()))
                .map(|(_, account)| account.clone()))
        }

        async fn find_account_by_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<AuthAccount>, AccountStoreError> {
            let accounts = self.accounts.read().await;
            Ok(accounts
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
            let key = secrecy::ExposeSecret::expose_secret(email.as_ref()).clone();
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&key) {
                return Err(AccountStoreError::AccountAlreadyExists);
            }
            let user = User::new(UserId::new(), email.clone());
            let account = AuthAccount::new(
                AccountId::new(),
                *user.user_id(),
                provider.clone(),
                email,
                password_hash,
            );
            accounts.insert(key, (user.clone(), account.clone()));
            Ok((user, account))
        }

        async fn set_totp_secret(
            &self,
            account_id: &AccountId,
            encoded_secret: String,
        ) -> Result<(), AccountStoreError> {
            let mut accounts = self.accounts.write().await;
            let entry = accounts
                .values_mut()
                .find(|(_, account)| account.account_id() == account_id)
                .ok_or(AccountStoreError::AccountNotFound)?;
            entry.1.enable_authenticator(encoded_secret);
            Ok(())
        }
    }

    fn email(raw: &str) -> Email {
        Email::try_from(Secret::from(raw.to_string())).unwrap()
    }

    fn pwd(raw: &str) -> Password {
        Password::try_from(Secret::from(raw.to_string())).unwrap()
    }

    fn otp(raw: &str) -> Option<OtpCode> {
        Some(OtpCode::try_from(raw.to_string()).unwrap())
    }

    fn attempt(flow: Flow, em: &str, pw: &str, code: Option<OtpCode>) -> AuthenticationAttempt {
        AuthenticationAttempt::new(flow, email(em), pwd(pw), code)
    }

    fn use_case(store: MockAccountStore) -> AuthorizeUseCase<MockAccountStore> {
        AuthorizeUseCase::new(store, ProviderId::mfa())
    }

    async fn seeded_store(em: &str, pw: &str) -> MockAccountStore {
        let store = MockAccountStore::default();
        let hash = pw::hash_password(&pwd(pw)).unwrap();
        store
            .create_user_and_account(&ProviderId::mfa(), email(em), hash)
            .await
            .unwrap();
        store
    }

    async fn provisioned_store(em: &str, pw: &str, secret: &[u8]) -> MockAccountStore {
        let store = seeded_store(em, pw).await;
        let account = store
            .find_account_by_provider_and_email(&ProviderId::mfa(), &email(em))
            .await
            .unwrap()
            .unwrap();
        store
            .set_totp_secret(account.account_id(), totp::encode_secret(secret))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn sign_up_terminates_with_mfa_not_setup() {
        let store = MockAccountStore::default();
        let result = use_case(store.clone())
            .execute(attempt(Flow::SignUp, "a@x.com", "password1", None))
            .await;
        assert_eq!(result, Err(AuthorizeError::MfaNotSetup));

        // The account was still created, unprovisioned.
        let account = store
            .find_account_by_provider_and_email(&ProviderId::mfa(), &email("a@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert!(!account.authenticator_is_setup());
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicate_email() {
        let store = seeded_store("a@x.com", "password1").await;
        let result = use_case(store)
            .execute(attempt(Flow::SignUp, "a@x.com", "password2", None))
            .await;
        assert_eq!(result, Err(AuthorizeError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn sign_up_rejects_short_password() {
        let result = use_case(MockAccountStore::default())
            .execute(attempt(Flow::SignUp, "a@x.com", "short", None))
            .await;
        assert_eq!(result, Err(AuthorizeError::InvalidPassword));
    }

    #[tokio::test]
    async fn sign_in_unknown_email_is_invalid_credentials() {
        let result = use_case(MockAccountStore::default())
            .execute(attempt(Flow::SignIn, "nobody@x.com", "password1", None))
            .await;
        assert_eq!(result, Err(AuthorizeError::InvalidCredentials));
    }

    #[tokio::test]
    async fn sign_in_wrong_password_is_invalid_credentials() {
        let store = seeded_store("a@x.com", "password1").await;
        let result = use_case(store)
            .execute(attempt(Flow::SignIn, "a@x.com", "password2", None))
            .await;
        assert_eq!(result, Err(AuthorizeError::InvalidCredentials));
    }

    #[tokio::test]
    async fn sign_in_before_provisioning_never_yields_a_session() {
        let store = seeded_store("a@x.com", "password1").await;
        let use_case = use_case(store);

        let without_otp = use_case
            .execute(attempt(Flow::SignIn, "a@x.com", "password1", None))
            .await;
        assert_eq!(without_otp, Err(AuthorizeError::MfaNotSetup));

        // Supplying an OTP changes nothing while unprovisioned.
        let with_otp = use_case
            .execute(attempt(Flow::SignIn, "a@x.com", "password1", otp("123456")))
            .await;
        assert_eq!(with_otp, Err(AuthorizeError::MfaNotSetup));
    }

    #[tokio::test]
    async fn sign_in_without_otp_is_missing_otp() {
        let secret = totp::generate_secret().unwrap();
        let store = provisioned_store("a@x.com", "password1", &secret).await;
        let result = use_case(store)
            .execute(attempt(Flow::SignIn, "a@x.com", "password1", None))
            .await;
        assert_eq!(result, Err(AuthorizeError::MissingOtp));
    }

    #[tokio::test]
    async fn sign_in_with_wrong_otp_is_invalid_otp() {
        let secret = totp::generate_secret().unwrap();
        let store = provisioned_store("a@x.com", "password1", &secret).await;
        let current = totp::generate_current(&secret).unwrap();
        let wrong = if current == "000000" { "000001" } else { "000000" };
        let result = use_case(store)
            .execute(attempt(Flow::SignIn, "a@x.com", "password1", otp(wrong)))
            .await;
        assert_eq!(result, Err(AuthorizeError::InvalidOtp));
    }

    #[tokio::test]
    async fn sign_in_with_current_otp_returns_the_principal() {
        let secret = totp::generate_secret().unwrap();
        let store = provisioned_store("a@x.com", "password1", &secret).await;
        let expected_user = store
            .find_user_by_email(&email("a@x.com"))
            .await
            .unwrap()
            .unwrap();

        let code = totp::generate_current(&secret).unwrap();
        let result = use_case(store)
            .execute(attempt(Flow::SignIn, "a@x.com", "password1", otp(&code)))
            .await
            .unwrap();
        assert_eq!(result.user_id, *expected_user.user_id());
    }
}
