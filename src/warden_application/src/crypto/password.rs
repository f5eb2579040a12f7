use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use warden_core::{Password, PasswordHash as StoredPasswordHash};

fn argon2() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

/// Hash a password with a fresh random salt, producing a PHC string.
pub fn hash_password(password: &Password) -> Result<StoredPasswordHash, String> {
    let salt: SaltString = SaltString::generate(rand_core::OsRng);
    argon2()?
        .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
        .map(|h| StoredPasswordHash::new(Secret::from(h.to_string())))
        .map_err(|e| e.to_string())
}

/// Check a candidate password against a stored hash.
///
/// A malformed stored hash verifies to `false` rather than erroring; the
/// underlying comparison is argon2's fixed-time verify.
pub fn verify_password(candidate: &Password, expected: &StoredPasswordHash) -> bool {
    let Ok(parsed) = PasswordHash::new(expected.as_ref().expose_secret()) else {
        return false;
    };
    let Ok(hasher) = argon2() else {
        return false;
    };
    hasher
        .verify_password(candidate.as_ref().expose_secret().as_bytes(), &parsed)
        .is_ok()
}

#[tracing::instrument(name = "Computing password hash", skip_all)]
pub async fn compute_password_hash(password: Password) -> Result<StoredPasswordHash, String> {
    let current_span: tracing::Span = tracing::Span::current();

    tokio::task::spawn_blocking(move || current_span.in_scope(move || hash_password(&password)))
        .await
        .map_err(|e| e.to_string())?
}

#[tracing::instrument(name = "Verify password hash", skip_all)]
pub async fn verify_password_hash(expected: StoredPasswordHash, candidate: Password) -> bool {
    let current_span: tracing::Span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| verify_password(&candidate, &expected))
    })
    .await
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(raw: &str) -> Password {
        Password::try_from(Secret::from(raw.to_string())).unwrap()
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password(&password("correct horse battery")).unwrap();
        assert!(verify_password(&password("correct horse battery"), &hash));
        assert!(!verify_password(&password("correct horse batterz"), &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password(&password("password123")).unwrap();
        let second = hash_password(&password("password123")).unwrap();
        assert_ne!(
            first.as_ref().expose_secret(),
            second.as_ref().expose_secret()
        );
    }

    #[test]
    fn malformed_hash_verifies_false() {
        let bogus = StoredPasswordHash::new(Secret::from("not-a-phc-string".to_string()));
        assert!(!verify_password(&password("anything"), &bogus));
    }

    #[tokio::test]
    async fn async_wrappers_agree_with_sync() {
        let hash = compute_password_hash(password("password123")).await.unwrap();
        assert!(verify_password_hash(hash.clone(), password("password123")).await);
        assert!(!verify_password_hash(hash, password("password124")).await);
    }
}
