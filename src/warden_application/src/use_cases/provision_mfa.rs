use warden_core::{
    AccountStore, AccountStoreError, AuthAccount, AuthErrorCode, Email, OtpCode, Password,
    ProviderId,
};

use crate::crypto::{password, totp};

/// Error types specific to MFA provisioning.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProvisionError {
    #[error("Account not found")]
    AccountNotFound,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("Something went wrong, please try again")]
    Unexpected(String),
}

impl ProvisionError {
    pub fn code(&self) -> AuthErrorCode {
        match self {
            ProvisionError::AccountNotFound => AuthErrorCode::AccountNotFound,
            ProvisionError::InvalidCredentials => AuthErrorCode::InvalidCredentials,
            ProvisionError::InvalidOtp => AuthErrorCode::InvalidOtp,
            ProvisionError::Unexpected(_) => AuthErrorCode::Internal,
        }
    }
}

/// A candidate secret handed back to the client during enrollment.
///
/// Held only in client memory until committed; the server stores nothing
/// between `begin` and `commit`, so abandoning the dialog leaks no
/// server-side state.
#[derive(Debug, Clone)]
pub struct PendingProvisioning {
    pub uri: String,
    pub secret_bytes: Vec<u8>,
}

/// MFA Provisioning Service.
///
/// `begin` issues a fresh candidate secret after re-proving the
/// password; `commit` verifies possession of the authenticator and is
/// the sole place an account's `authenticator_is_setup` becomes true.
pub struct ProvisionMfaUseCase<S>
where
    S: AccountStore,
{
    account_store: S,
    provider: ProviderId,
    issuer: String,
}

impl<S> ProvisionMfaUseCase<S>
where
    S: AccountStore,
{
    pub fn new(account_store: S, provider: ProviderId, issuer: impl Into<String>) -> Self {
        Self {
            account_store,
            provider,
            issuer: issuer.into(),
        }
    }

    /// Generate a fresh secret and its enrollment URI.
    ///
    /// Persists nothing: a second call yields an unrelated secret and
    /// the stored account is untouched until `commit`.
    #[tracing::instrument(name = "ProvisionMfaUseCase::begin", skip_all)]
    pub async fn begin(
        &self,
        email: Email,
        password: Password,
    ) -> Result<PendingProvisioning, ProvisionError> {
        self.authenticate(&email, password).await?;

        let secret_bytes =
            totp::generate_secret().map_err(|e| ProvisionError::Unexpected(e.to_string()))?;
        let uri = totp::enrollment_uri(
            &self.issuer,
            secrecy::ExposeSecret::expose_secret(email.as_ref()),
            &secret_bytes,
        )
        .map_err(|e| ProvisionError::Unexpected(e.to_string()))?;

        Ok(PendingProvisioning { uri, secret_bytes })
    }

    /// Prove possession and commit the secret to the account.
    ///
    /// The OTP is checked against the SUPPLIED bytes, not anything
    /// stored; on success the secret and the setup flag are written as
    /// one atomic patch.
    #[tracing::instrument(name = "ProvisionMfaUseCase::commit", skip_all)]
    pub async fn commit(
        &self,
        email: Email,
        password: Password,
        otp: OtpCode,
        secret_bytes: Vec<u8>,
    ) -> Result<(), ProvisionError> {
        let account = self.authenticate(&email, password).await?;

        if !totp::verify(&secret_bytes, otp.as_str()) {
            return Err(ProvisionError::InvalidOtp);
        }

        let encoded = totp::encode_secret(&secret_bytes);
        match self
            .account_store
            .set_totp_secret(account.account_id(), encoded)
            .await
        {
            Ok(()) => Ok(()),
            Err(AccountStoreError::AccountNotFound) => Err(ProvisionError::AccountNotFound),
            Err(e) => {
                tracing::error!(error = %e, "account store failure during provisioning commit");
                Err(ProvisionError::Unexpected(e.to_string()))
            }
        }
    }

    /// Re-prove the password before any provisioning step. Both `begin`
    /// and `commit` do this, so a stolen in-flight secret is useless
    /// without the credential.
    async fn authenticate(
        &self,
        email: &Email,
        password: Password,
    ) -> Result<AuthAccount, ProvisionError> {
        let user = self
            .account_store
            .find_user_by_email(email)
            .await
            .map_err(|e| ProvisionError::Unexpected(e.to_string()))?
            .ok_or(ProvisionError::AccountNotFound)?;

        let account = self
            .account_store
            .find_account_by_user(user.user_id())
            .await
            .map_err(|e| ProvisionError::Unexpected(e.to_string()))?
            .ok_or(ProvisionError::AccountNotFound)?;

        if account.provider() != &self.provider {
            return Err(ProvisionError::AccountNotFound);
        }

        let verified =
            password::verify_password_hash(account.password_hash().clone(), password).await;
        if !verified {
            return Err(ProvisionError::InvalidCredentials);
        }

        Ok(account)
    }
}
