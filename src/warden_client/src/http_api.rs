use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use warden_core::{AuthErrorCode, Flow, SessionPrincipal};

use crate::api::{ApiError, AuthApi, PendingTotp};

/// Failure body shared by every route: human message plus machine code.
#[derive(Debug, Deserialize)]
struct FailureBody {
    error: String,
    #[serde(default)]
    code: Option<AuthErrorCode>,
}

#[derive(Debug, Deserialize)]
struct BeginBody {
    uri: String,
    #[serde(rename = "secretBytes")]
    secret_bytes: String,
}

#[derive(Debug, Deserialize)]
struct CommitBody {
    success: bool,
}

/// JSON-over-HTTP implementation of [`AuthApi`].
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAuthApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn post<T>(&self, path: &str, body: serde_json::Value) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()));
        }

        let failure = response
            .json::<FailureBody>()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Err(ApiError::Auth {
            // A body without a code is a server from before codes were
            // introduced; treat it as opaque.
            code: failure.code.unwrap_or(AuthErrorCode::Internal),
            message: failure.error,
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn authorize(
        &self,
        flow: Flow,
        email: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<SessionPrincipal, ApiError> {
        let mut body = serde_json::json!({
            "flow": flow.as_str(),
            "email": email,
            "password": password,
        });
        if let Some(otp) = otp {
            body["otp"] = serde_json::Value::from(otp);
        }

        self.post("authorize", body).await
    }

    async fn begin_provisioning(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PendingTotp, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let begun: BeginBody = self.post("mfa/begin", body).await?;

        let secret_bytes = BASE64
            .decode(begun.secret_bytes.as_bytes())
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(PendingTotp {
            uri: begun.uri,
            secret_bytes,
        })
    }

    async fn commit_provisioning(
        &self,
        email: &str,
        password: &str,
        otp: &str,
        secret_bytes: &[u8],
    ) -> Result<bool, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "otp": otp,
            "secretBytes": BASE64.encode(secret_bytes),
        });
        let committed: CommitBody = self.post("mfa/commit", body).await?;
        Ok(committed.success)
    }
}
