//! Axum-specific MFA provisioning routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_application::use_cases::provision_mfa::{ProvisionError, ProvisionMfaUseCase};
use warden_core::{AccountStore, Email, OtpCode, Password};

use crate::routes::{AuthState, status_for};

/// Axum-specific request body for starting provisioning.
#[derive(Debug, Deserialize)]
pub struct BeginMfaRequest {
    /// User's email address
    #[serde(default)]
    pub email: Option<Secret<String>>,

    /// User's password, re-proven before a secret is issued
    #[serde(default)]
    pub password: Option<Secret<String>>,
}

/// Candidate secret and its enrollment URI, nothing persisted yet.
#[derive(Debug, Serialize)]
pub struct BeginMfaResponse {
    pub uri: String,

    /// Raw secret bytes, base64 for transport only
    #[serde(rename = "secretBytes")]
    pub secret_bytes: String,
}

/// Axum-specific request body for committing provisioning.
#[derive(Debug, Deserialize)]
pub struct CommitMfaRequest {
    /// User's email address
    #[serde(default)]
    pub email: Option<Secret<String>>,

    /// User's password, re-proven before the secret is committed
    #[serde(default)]
    pub password: Option<Secret<String>>,

    /// The code generated by the authenticator for the candidate secret
    #[serde(default)]
    pub otp: Option<String>,

    /// The candidate secret bytes from `beginProvisioning`, base64
    #[serde(rename = "secretBytes")]
    pub secret_bytes: String,
}

#[derive(Debug, Serialize)]
pub struct CommitMfaResponse {
    pub success: bool,
}

/// Axum route starting MFA provisioning.
#[tracing::instrument(name = "Begin MFA provisioning", skip(state, request))]
pub async fn begin_mfa<S>(
    State(state): State<AuthState<S>>,
    Json(request): Json<BeginMfaRequest>,
) -> Result<impl IntoResponse, ProvisionRouteError>
where
    S: AccountStore + Clone + 'static,
{
    let (email, password) = parse_credentials(request.email, request.password)?;

    let use_case = ProvisionMfaUseCase::new(
        state.account_store.clone(),
        state.provider.clone(),
        state.issuer.clone(),
    );
    let pending = use_case.begin(email, password).await?;

    Ok(Json(BeginMfaResponse {
        uri: pending.uri,
        secret_bytes: BASE64.encode(pending.secret_bytes),
    }))
}

/// Axum route committing MFA provisioning after proof of possession.
#[tracing::instrument(name = "Commit MFA provisioning", skip(state, request))]
pub async fn commit_mfa<S>(
    State(state): State<AuthState<S>>,
    Json(request): Json<CommitMfaRequest>,
) -> Result<impl IntoResponse, ProvisionRouteError>
where
    S: AccountStore + Clone + 'static,
{
    let (email, password) = parse_credentials(request.email, request.password)?;
    let otp = request
        .otp
        .ok_or(ProvisionRouteError::MissingOtp)
        .and_then(|raw| OtpCode::try_from(raw).map_err(|_| ProvisionRouteError::MissingOtp))?;
    let secret_bytes = BASE64
        .decode(request.secret_bytes.as_bytes())
        .map_err(|_| ProvisionRouteError::MalformedSecretBytes)?;

    let use_case = ProvisionMfaUseCase::new(
        state.account_store.clone(),
        state.provider.clone(),
        state.issuer.clone(),
    );
    use_case.commit(email, password, otp, secret_bytes).await?;

    Ok(Json(CommitMfaResponse { success: true }))
}

fn parse_credentials(
    email: Option<Secret<String>>,
    password: Option<Secret<String>>,
) -> Result<(Email, Password), ProvisionRouteError> {
    let email = email
        .ok_or(ProvisionRouteError::MissingCredential)
        .and_then(|raw| {
            Email::try_from(raw).map_err(|_| ProvisionRouteError::MissingCredential)
        })?;
    let password = password
        .ok_or(ProvisionRouteError::MissingCredential)
        .and_then(|raw| {
            Password::try_from(raw).map_err(|_| ProvisionRouteError::MissingCredential)
        })?;
    Ok((email, password))
}

/// Errors that can occur during MFA provisioning
#[derive(Debug, Error)]
pub enum ProvisionRouteError {
    #[error("Missing email or password")]
    MissingCredential,

    #[error("Missing OTP")]
    MissingOtp,

    #[error("Malformed secret bytes")]
    MalformedSecretBytes,

    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

impl IntoResponse for ProvisionRouteError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, code) = match &self {
            ProvisionRouteError::MissingCredential => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                warden_core::AuthErrorCode::MissingCredential,
            ),
            ProvisionRouteError::MissingOtp => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                warden_core::AuthErrorCode::MissingOtp,
            ),
            ProvisionRouteError::MalformedSecretBytes => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                warden_core::AuthErrorCode::Internal,
            ),
            ProvisionRouteError::Provision(error) => {
                (status_for(error.code()), error.to_string(), error.code())
            }
        };

        (
            status,
            Json(serde_json::json!({ "error": message, "code": code })),
        )
            .into_response()
    }
}
