use secrecy::Secret;
use serde::Deserialize;

use crate::config::constants::{env, prod};

/// Service configuration, layered: defaults, then an optional
/// `warden.json` file, then `WARDEN__`-prefixed environment variables
/// (`.env` is loaded first via dotenvy).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthServiceSettings {
    pub application: ApplicationSettings,
    pub mfa: MfaSettings,
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub allowed_origins: Option<AllowedOrigins>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MfaSettings {
    /// Issuer label shown in authenticator apps.
    pub issuer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
}

/// Exact-match CORS origin allowlist.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(origins)
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

impl AuthServiceSettings {
    /// Load settings from `.env`, `warden.json` and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .set_default("application.address", prod::APP_ADDRESS)?
            .set_default("mfa.issuer", prod::TOTP_ISSUER)?
            .add_source(config::File::with_name("warden").required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .separator("__")
                    .try_parsing(true),
            );

        // DATABASE_URL is the conventional spelling, so map it in when
        // the prefixed form is absent.
        let builder = match std::env::var(env::DATABASE_URL_ENV_VAR) {
            Ok(url) => builder.set_override("postgres.url", url)?,
            Err(_) => builder,
        };
        let builder = match std::env::var(env::TOTP_ISSUER_ENV_VAR) {
            Ok(issuer) => builder.set_override("mfa.issuer", issuer)?,
            Err(_) => builder,
        };
        // Comma-separated origin list.
        let builder = match std::env::var(env::ALLOWED_ORIGINS_ENV_VAR) {
            Ok(origins) => builder.set_override(
                "allowed_origins",
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>(),
            )?,
            Err(_) => builder,
        };

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_origins_match_exactly() {
        let origins = AllowedOrigins::new(vec![
            "https://app.example.com".to_string(),
            "http://localhost:5173".to_string(),
        ]);
        assert!(origins.contains("https://app.example.com"));
        assert!(!origins.contains("https://evil.example.com"));
        assert!(!origins.contains("https://app.example.com/"));
    }
}
