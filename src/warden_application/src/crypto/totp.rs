use data_encoding::BASE32_NOPAD;
use rand::TryRngCore;
use rand::rngs::OsRng;
use thiserror::Error;
use totp_rs::{Algorithm, TOTP};

/// RFC 6238 parameters shared by enrollment and verification. SHA-1,
/// six digits and a 30 second step for authenticator-app compatibility;
/// skew 0 means only the current step is accepted.
const DIGITS: usize = 6;
const SKEW: u8 = 0;
const STEP_SECONDS: u64 = 30;

pub const SECRET_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum TotpError {
    #[error("Failed to source random bytes: {0}")]
    SecretGeneration(String),
    #[error("Stored TOTP secret is not valid base32")]
    MalformedStoredSecret,
    #[error("Failed to build TOTP parameters: {0}")]
    InvalidParameters(String),
}

/// Generate a fresh shared secret from the operating system CSPRNG.
pub fn generate_secret() -> Result<Vec<u8>, TotpError> {
    let mut bytes = [0u8; SECRET_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TotpError::SecretGeneration(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Base32 upper-case, no padding: the at-rest secret representation.
pub fn encode_secret(secret: &[u8]) -> String {
    BASE32_NOPAD.encode(secret)
}

pub fn decode_secret(encoded: &str) -> Result<Vec<u8>, TotpError> {
    BASE32_NOPAD
        .decode(encoded.as_bytes())
        .map_err(|_| TotpError::MalformedStoredSecret)
}

/// Standard `otpauth://totp/...` enrollment URI for third-party
/// authenticator apps.
pub fn enrollment_uri(issuer: &str, account: &str, secret: &[u8]) -> Result<String, TotpError> {
    let totp = build_totp(secret, Some(issuer.to_string()), account.to_string())?;
    Ok(totp.get_url())
}

/// Check a candidate code against the current time step.
///
/// Fails closed: malformed codes, bad secrets and clock errors all come
/// back as `false`. The comparison itself is fixed-time inside totp-rs.
pub fn verify(secret: &[u8], code: &str) -> bool {
    if !is_well_formed(code) {
        return false;
    }
    let Ok(totp) = build_totp(secret, None, "account".to_string()) else {
        return false;
    };
    match totp.check_current(code) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "TOTP verification failed to read system time");
            false
        }
    }
}

/// Check a candidate code at an explicit unix timestamp.
pub fn verify_at(secret: &[u8], code: &str, time: u64) -> bool {
    if !is_well_formed(code) {
        return false;
    }
    let Ok(totp) = build_totp(secret, None, "account".to_string()) else {
        return false;
    };
    totp.check(code, time)
}

/// The valid code for the current time step.
pub fn generate_current(secret: &[u8]) -> Result<String, TotpError> {
    let totp = build_totp(secret, None, "account".to_string())?;
    totp.generate_current()
        .map_err(|e| TotpError::InvalidParameters(e.to_string()))
}

/// The valid code at an explicit unix timestamp.
pub fn generate_at(secret: &[u8], time: u64) -> Result<String, TotpError> {
    let totp = build_totp(secret, None, "account".to_string())?;
    Ok(totp.generate(time))
}

fn is_well_formed(code: &str) -> bool {
    code.len() == DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

fn build_totp(
    secret: &[u8],
    issuer: Option<String>,
    account_name: String,
) -> Result<TOTP, TotpError> {
    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP_SECONDS,
        secret.to_vec(),
        issuer,
        account_name,
    )
    .map_err(|e| TotpError::InvalidParameters(e.to_string()))
}
