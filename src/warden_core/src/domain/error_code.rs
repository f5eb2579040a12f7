use serde::{Deserialize, Serialize};

/// Machine-readable outcome code carried alongside every failure message.
///
/// Clients dispatch on this code, never on message text or HTTP status.
/// The wire spelling is stable; renaming a variant is a protocol break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    /// Sign-up with an email that already has an account.
    EmailAlreadyExists,
    /// Sign-up password failed the minimum policy.
    InvalidPassword,
    /// Unknown account or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    /// The account exists but has no committed authenticator yet.
    MfaNotSetup,
    /// Credentials were accepted but no OTP was attached.
    MissingOtp,
    /// The submitted OTP did not match the current time step.
    InvalidOtp,
    /// The flow tag was not one of the supported values.
    UnsupportedFlow,
    /// Email or password absent from the request.
    MissingCredential,
    /// Provisioning was asked about a user or account that does not exist.
    AccountNotFound,
    /// Infrastructure failure; detail stays in the server logs.
    Internal,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AuthErrorCode::InvalidPassword => "INVALID_PASSWORD",
            AuthErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthErrorCode::MfaNotSetup => "MFA_NOT_SETUP",
            AuthErrorCode::MissingOtp => "MISSING_OTP",
            AuthErrorCode::InvalidOtp => "INVALID_OTP",
            AuthErrorCode::UnsupportedFlow => "UNSUPPORTED_FLOW",
            AuthErrorCode::MissingCredential => "MISSING_CREDENTIAL",
            AuthErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AuthErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_spelling_matches_as_str() {
        let all = [
            AuthErrorCode::EmailAlreadyExists,
            AuthErrorCode::InvalidPassword,
            AuthErrorCode::InvalidCredentials,
            AuthErrorCode::MfaNotSetup,
            AuthErrorCode::MissingOtp,
            AuthErrorCode::InvalidOtp,
            AuthErrorCode::UnsupportedFlow,
            AuthErrorCode::MissingCredential,
            AuthErrorCode::AccountNotFound,
            AuthErrorCode::Internal,
        ];
        for code in all {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            let parsed: AuthErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, code);
        }
    }
}
