use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpCodeError {
    #[error("OTP code is missing")]
    Missing,
}

/// A candidate one-time password as submitted by the user.
///
/// Only emptiness is rejected here; anything else (wrong length,
/// non-digits) is handled by verification, which fails closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OtpCode {
    type Error = OtpCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(OtpCodeError::Missing);
        }
        Ok(Self(value))
    }
}
