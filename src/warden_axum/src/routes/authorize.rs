//! Axum-specific authorize route.

use axum::{Json, extract::State, response::IntoResponse};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;
use warden_application::use_cases::authorize::{AuthorizeError, AuthorizeUseCase};
use warden_core::{AccountStore, AuthenticationAttempt, Email, Flow, OtpCode, Password};

use crate::routes::{AuthState, status_for};

/// Axum-specific request body for authorize.
///
/// Credentials are optional at the serde layer so their absence turns
/// into the structured `MISSING_CREDENTIAL` signal instead of a generic
/// body-rejection.
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    /// Requested flow: "signUp" or "signIn"
    pub flow: String,

    /// User's email address
    #[serde(default)]
    pub email: Option<Secret<String>>,

    /// User's password
    #[serde(default)]
    pub password: Option<Secret<String>>,

    /// One-time password, required once the authenticator is set up
    #[serde(default)]
    pub otp: Option<String>,
}

/// Axum authorize route.
///
/// Parses the attempt, runs the Credential Authority, and returns the
/// session principal on success.
#[tracing::instrument(name = "Authorize", skip(state, request))]
pub async fn authorize<S>(
    State(state): State<AuthState<S>>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<impl IntoResponse, AuthorizeRouteError>
where
    S: AccountStore + Clone + 'static,
{
    let flow = Flow::try_from(request.flow.as_str())
        .map_err(|e| AuthorizeError::UnsupportedFlow(e.0))?;
    let email = request
        .email
        .ok_or(AuthorizeError::MissingCredential)
        .and_then(|raw| Email::try_from(raw).map_err(|_| AuthorizeError::MissingCredential))?;
    // An absent or empty password is a policy failure on sign-up and a
    // missing credential on sign-in.
    let password_error = match flow {
        Flow::SignUp => AuthorizeError::InvalidPassword,
        Flow::SignIn => AuthorizeError::MissingCredential,
    };
    let password = request
        .password
        .ok_or_else(|| password_error.clone())
        .and_then(|raw| Password::try_from(raw).map_err(|_| password_error))?;
    // An empty OTP field is the same as no OTP at all.
    let otp = request.otp.and_then(|raw| OtpCode::try_from(raw).ok());

    let use_case = AuthorizeUseCase::new(state.account_store.clone(), state.provider.clone());
    let principal = use_case
        .execute(AuthenticationAttempt::new(flow, email, password, otp))
        .await?;

    Ok(Json(principal))
}

/// Errors that can occur during authorization
#[derive(Debug, Error)]
pub enum AuthorizeRouteError {
    #[error(transparent)]
    Authorize(#[from] AuthorizeError),
}

impl IntoResponse for AuthorizeRouteError {
    fn into_response(self) -> axum::response::Response {
        let AuthorizeRouteError::Authorize(error) = self;
        let code = error.code();

        (
            status_for(code),
            Json(serde_json::json!({ "error": error.to_string(), "code": code })),
        )
            .into_response()
    }
}
