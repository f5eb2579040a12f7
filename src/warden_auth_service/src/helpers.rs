use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use warden_adapters::config::AuthServiceSettings;

/// Configure and return a PostgreSQL connection pool
///
/// Loads the database URL from configuration, creates a connection pool
/// and runs all pending migrations.
///
/// # Panics
/// Panics if unable to load settings, create the pool or run migrations
pub async fn configure_postgresql() -> PgPool {
    let settings = AuthServiceSettings::load().expect("Failed to load settings");
    let db_url = settings.postgres.url.expose_secret();

    let pg_pool = get_postgres_pool(db_url)
        .await
        .expect("Failed to create Postgres connection pool");

    // Run database migrations
    sqlx::migrate!("../warden_adapters/migrations")
        .run(&pg_pool)
        .await
        .expect("Failed to run migrations");

    pg_pool
}

/// Create a PostgreSQL connection pool
pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}
