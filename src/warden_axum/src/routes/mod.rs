mod authorize;
mod mfa;

pub use authorize::{AuthorizeRequest, AuthorizeRouteError, authorize};
pub use mfa::{
    BeginMfaRequest, BeginMfaResponse, CommitMfaRequest, CommitMfaResponse, ProvisionRouteError,
    begin_mfa, commit_mfa,
};

use axum::http::StatusCode;
use warden_core::{AuthErrorCode, ProviderId};

/// Per-route state: the store plus the injected provider identity and
/// TOTP issuer label. Cloned per request, like the stores themselves.
#[derive(Clone)]
pub struct AuthState<S> {
    pub account_store: S,
    pub provider: ProviderId,
    pub issuer: String,
}

impl<S> AuthState<S> {
    pub fn new(account_store: S, provider: ProviderId, issuer: impl Into<String>) -> Self {
        Self {
            account_store,
            provider,
            issuer: issuer.into(),
        }
    }
}

/// HTTP status for a failure code. Clients dispatch on the body's
/// `code` field; the status is advisory.
pub(crate) fn status_for(code: AuthErrorCode) -> StatusCode {
    match code {
        AuthErrorCode::MissingCredential
        | AuthErrorCode::InvalidPassword
        | AuthErrorCode::UnsupportedFlow => StatusCode::BAD_REQUEST,
        AuthErrorCode::InvalidCredentials | AuthErrorCode::InvalidOtp => StatusCode::UNAUTHORIZED,
        AuthErrorCode::EmailAlreadyExists => StatusCode::CONFLICT,
        AuthErrorCode::MfaNotSetup | AuthErrorCode::MissingOtp => StatusCode::FORBIDDEN,
        AuthErrorCode::AccountNotFound => StatusCode::NOT_FOUND,
        AuthErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
