use async_trait::async_trait;
use thiserror::Error;
use warden_core::{AuthErrorCode, Flow, SessionPrincipal};

/// A candidate secret held in client memory between `begin` and
/// `commit`. Discarded when the dialog closes; the server keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTotp {
    /// Enrollment URI for the authenticator app.
    pub uri: String,
    /// Raw secret bytes, echoed back verbatim on commit.
    pub secret_bytes: Vec<u8>,
}

/// A failed RPC as seen by the client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a structured failure.
    #[error("{message}")]
    Auth {
        code: AuthErrorCode,
        message: String,
    },
    /// The server could not be reached or answered garbage.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn code(&self) -> Option<AuthErrorCode> {
        match self {
            ApiError::Auth { code, .. } => Some(*code),
            ApiError::Transport(_) => None,
        }
    }
}

/// The logical RPC surface of the Credential Authority and the MFA
/// Provisioning Service, as seen from the client.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn authorize(
        &self,
        flow: Flow,
        email: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<SessionPrincipal, ApiError>;

    async fn begin_provisioning(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PendingTotp, ApiError>;

    async fn commit_provisioning(
        &self,
        email: &str,
        password: &str,
        otp: &str,
        secret_bytes: &[u8],
    ) -> Result<bool, ApiError>;
}
