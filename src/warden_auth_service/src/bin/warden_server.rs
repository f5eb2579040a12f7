use tokio::net::TcpListener;
use warden_adapters::config::AuthServiceSettings;
use warden_adapters::persistence::PostgresAccountStore;
use warden_auth_service::{AuthService, configure_postgresql, init_tracing};
use warden_core::ProviderId;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    init_tracing()?;

    let settings = AuthServiceSettings::load()?;
    let pool = configure_postgresql().await;
    let account_store = PostgresAccountStore::new(pool);

    let service = AuthService::new(account_store, ProviderId::mfa(), settings.mfa.issuer.clone());

    let listener = TcpListener::bind(&settings.application.address).await?;
    service
        .run_standalone(listener, settings.allowed_origins)
        .await?;

    Ok(())
}
