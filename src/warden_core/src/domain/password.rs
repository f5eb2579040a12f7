use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

/// Minimum length enforced at sign-up time.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password is missing")]
    Missing,
}

/// A user-supplied password.
///
/// Construction only rejects the empty string: sign-in must accept any
/// submitted password and fail with a uniform credentials error, so the
/// sign-up strength policy is checked separately via
/// [`Password::meets_signup_policy`].
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn as_ref(&self) -> &Secret<String> {
        &self.0
    }

    /// Sign-up policy: at least [`MIN_PASSWORD_LEN`] characters.
    pub fn meets_signup_policy(&self) -> bool {
        self.0.expose_secret().chars().count() >= MIN_PASSWORD_LEN
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().is_empty() {
            return Err(PasswordError::Missing);
        }
        Ok(Self(value))
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for Password {}
