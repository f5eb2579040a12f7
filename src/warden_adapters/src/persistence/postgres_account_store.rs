use secrecy::Secret;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use warden_core::{
    AccountId, AccountStore, AccountStoreError, AuthAccount, Email, PasswordHash, ProviderId,
    User, UserId,
};

#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: sqlx::PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresAccountStore { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[tracing::instrument(name = "Finding user in PostgreSQL", skip_all)]
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, AccountStoreError> {
        let row = sqlx::query(
            r#"
                SELECT user_id, email
                FROM users
                WHERE email = $1
            "#,
        )
        .bind(expose(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        row.map(user_from_row).transpose()
    }

    #[tracing::instrument(name = "Finding account by provider and email in PostgreSQL", skip_all)]
    async fn find_account_by_provider_and_email(
        &self,
        provider: &ProviderId,
        email: &Email,
    ) -> Result<Option<AuthAccount>, AccountStoreError> {
        let row = sqlx::query(
            r#"
                SELECT account_id, user_id, provider, email, password_hash,
                       authenticator_is_setup, totp_secret
                FROM auth_accounts
                WHERE provider = $1 AND email = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(expose(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        row.map(account_from_row).transpose()
    }

    #[tracing::instrument(name = "Finding account by user in PostgreSQL", skip_all)]
    async fn find_account_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthAccount>, AccountStoreError> {
        let row = sqlx::query(
            r#"
                SELECT account_id, user_id, provider, email, password_hash,
                       authenticator_is_setup, totp_secret
                FROM auth_accounts
                WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        row.map(account_from_row).transpose()
    }

    #[tracing::instrument(name = "Creating user and account in PostgreSQL", skip_all)]
    async fn create_user_and_account(
        &self,
        provider: &ProviderId,
        email: Email,
        password_hash: PasswordHash,
    ) -> Result<(User, AuthAccount), AccountStoreError> {
        let user = User::new(UserId::new(), email.clone());
        let account = AuthAccount::new(
            AccountId::new(),
            *user.user_id(),
            provider.clone(),
            email.clone(),
            password_hash,
        );

        // One transaction: a user row never exists without its account
        // row, and the (provider, email) unique index decides races.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        sqlx::query(
            r#"
                INSERT INTO users (user_id, email)
                VALUES ($1, $2)
            "#,
        )
        .bind(user.user_id().as_uuid())
        .bind(expose(&email))
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        sqlx::query(
            r#"
                INSERT INTO auth_accounts
                    (account_id, user_id, provider, email, password_hash,
                     authenticator_is_setup, totp_secret)
                VALUES ($1, $2, $3, $4, $5, FALSE, NULL)
            "#,
        )
        .bind(account.account_id().as_uuid())
        .bind(user.user_id().as_uuid())
        .bind(provider.as_str())
        .bind(expose(&email))
        .bind(secrecy::ExposeSecret::expose_secret(
            account.password_hash().as_ref(),
        ))
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit()
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        Ok((user, account))
    }

    #[tracing::instrument(name = "Committing TOTP secret in PostgreSQL", skip_all)]
    async fn set_totp_secret(
        &self,
        account_id: &AccountId,
        encoded_secret: String,
    ) -> Result<(), AccountStoreError> {
        // Single statement so the secret and the flag can never diverge.
        let result = sqlx::query(
            r#"
                UPDATE auth_accounts
                SET totp_secret = $1, authenticator_is_setup = TRUE
                WHERE account_id = $2
            "#,
        )
        .bind(&encoded_secret)
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountStoreError::AccountNotFound);
        }

        Ok(())
    }
}

fn expose(email: &Email) -> &str {
    secrecy::ExposeSecret::expose_secret(email.as_ref())
}

fn map_insert_error(e: sqlx::Error) -> AccountStoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AccountStoreError::AccountAlreadyExists;
        }
    }
    AccountStoreError::UnexpectedError(e.to_string())
}

fn user_from_row(row: PgRow) -> Result<User, AccountStoreError> {
    let user_id: Uuid = row
        .try_get("user_id")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let email = Email::try_from(Secret::from(email))
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    Ok(User::new(UserId::from(user_id), email))
}

fn account_from_row(row: PgRow) -> Result<AuthAccount, AccountStoreError> {
    let account_id: Uuid = row
        .try_get("account_id")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let user_id: Uuid = row
        .try_get("user_id")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let provider: String = row
        .try_get("provider")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let authenticator_is_setup: bool = row
        .try_get("authenticator_is_setup")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
    let totp_secret: Option<String> = row
        .try_get("totp_secret")
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

    let email = Email::try_from(Secret::from(email))
        .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;

    AuthAccount::from_parts(
        AccountId::from(account_id),
        UserId::from(user_id),
        ProviderId::new(provider),
        email,
        PasswordHash::new(Secret::from(password_hash)),
        authenticator_is_setup,
        totp_secret,
    )
    .ok_or_else(|| {
        AccountStoreError::UnexpectedError(
            "stored account violates the authenticator/secret invariant".to_string(),
        )
    })
}
