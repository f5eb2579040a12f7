use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use warden_adapters::config::AllowedOrigins;
use warden_axum::{AuthState, authorize, begin_mfa, commit_mfa};
use warden_core::{AccountStore, ProviderId};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// Main authentication service exposing the credential and MFA routes.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    /// Create a new AuthService around the provided account store.
    ///
    /// The provider tag and TOTP issuer label are injected here; nothing
    /// is registered globally at module load.
    ///
    /// # Note on Architecture
    /// Stores implement Clone via internal shared state, so the single
    /// route state can be cloned per request cheaply.
    pub fn new<S>(account_store: S, provider: ProviderId, issuer: impl Into<String>) -> Self
    where
        S: AccountStore + Clone + 'static,
    {
        let state = AuthState::new(account_store, provider, issuer);

        let router = Router::new()
            .route("/authorize", post(authorize::<S>))
            .route("/mfa/begin", post(begin_mfa::<S>))
            .route("/mfa/commit", post(commit_mfa::<S>))
            .with_state(state);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Convert the AuthService into a router that can be mounted on
    /// another application.
    ///
    /// # Arguments
    /// * `allowed_origins` - Optional exact-match list of CORS origins
    pub fn as_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        origin
                            .to_str()
                            .is_ok_and(|origin| allowed_origins.contains(origin))
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run the auth service as a standalone server.
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum::serve(listener, router).await
    }
}
