//! End-to-end tests driving the client flow controller against a real
//! server instance over HTTP.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Url;
use warden_adapters::persistence::HashMapAccountStore;
use warden_application::crypto::totp;
use warden_auth_service::AuthService;
use warden_client::{ApiError, AuthApi, FlowController, FlowState, HttpAuthApi, MfaStage};
use warden_core::{AccountStore, AuthErrorCode, Email, Flow, ProviderId};

async fn spawn_app() -> (HttpAuthApi, HashMapAccountStore) {
    let store = HashMapAccountStore::new();
    let service = AuthService::new(store.clone(), ProviderId::mfa(), "Warden-Test");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind an ephemeral port");
    let address = listener.local_addr().unwrap();
    let router = service.as_router(None);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let base_url = Url::parse(&format!("http://{address}/")).unwrap();
    (HttpAuthApi::new(base_url), store)
}

/// What an authenticator app does with the QR code: pull the shared
/// secret out of the enrollment URI and derive codes from it.
fn secret_from_uri(uri: &str) -> Vec<u8> {
    let (_, query) = uri.split_once('?').expect("uri has a query string");
    let encoded = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("secret="))
        .expect("uri carries a secret parameter");
    totp::decode_secret(encoded).expect("secret parameter is base32")
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// A six digit string that is neither the current nor the next code.
fn wrong_code(secret: &[u8]) -> String {
    let current = totp::generate_current(secret).unwrap();
    let next = totp::generate_at(secret, unix_now() + 30).unwrap();
    ["000000", "000001", "000002"]
        .into_iter()
        .find(|c| *c != current && *c != next)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn sign_up_through_provisioning_to_a_session() {
    let (api, store) = spawn_app().await;
    let mut controller = FlowController::new(api);

    // sign-up never yields a session; it opens the setup dialog
    controller.toggle_flow();
    assert_eq!(controller.flow(), Flow::SignUp);
    controller.submit_credentials("a@x.com", "password1").await;
    assert_eq!(
        controller.state(),
        &FlowState::AwaitingMfa {
            stage: MfaStage::Setup
        }
    );

    // enroll like an authenticator app and prove possession
    let uri = controller.enrollment_uri().expect("setup stage shows a uri");
    let secret = secret_from_uri(uri);
    let code = totp::generate_current(&secret).unwrap();
    controller.set_otp(code);
    controller.submit_otp().await;

    assert!(
        matches!(controller.state(), FlowState::Authenticated(_)),
        "expected a session, got {:?} (error: {:?})",
        controller.state(),
        controller.error()
    );

    // the account is now committed server-side
    let email = Email::try_from(secrecy::Secret::from("a@x.com".to_string())).unwrap();
    let account = store
        .find_account_by_provider_and_email(&ProviderId::mfa(), &email)
        .await
        .unwrap()
        .unwrap();
    assert!(account.authenticator_is_setup());
    assert_eq!(account.totp_secret(), Some(totp::encode_secret(&secret).as_str()));
}

#[tokio::test]
async fn unknown_email_fails_uniformly() {
    let (api, _store) = spawn_app().await;

    let result = api
        .authorize(Flow::SignIn, "nobody@x.com", "password1", None)
        .await;

    // Uniform credentials failure, never an account-existence oracle.
    let error = result.unwrap_err();
    assert_eq!(error.code(), Some(AuthErrorCode::InvalidCredentials));
    assert_eq!(
        error,
        ApiError::Auth {
            code: AuthErrorCode::InvalidCredentials,
            message: "Invalid email or password".to_string(),
        }
    );
}

#[tokio::test]
async fn sign_up_then_sign_in_without_otp_is_mfa_not_setup() {
    let (api, _store) = spawn_app().await;

    let signed_up = api
        .authorize(Flow::SignUp, "a@x.com", "password1", None)
        .await;
    assert_eq!(
        signed_up.unwrap_err().code(),
        Some(AuthErrorCode::MfaNotSetup)
    );

    let signed_in = api
        .authorize(Flow::SignIn, "a@x.com", "password1", None)
        .await;
    assert_eq!(
        signed_in.unwrap_err().code(),
        Some(AuthErrorCode::MfaNotSetup)
    );

    // even with an OTP attached there is no session before provisioning
    let with_otp = api
        .authorize(Flow::SignIn, "a@x.com", "password1", Some("123456"))
        .await;
    assert_eq!(
        with_otp.unwrap_err().code(),
        Some(AuthErrorCode::MfaNotSetup)
    );
}

async fn provisioned_account(api: &HttpAuthApi) -> Vec<u8> {
    api.authorize(Flow::SignUp, "a@x.com", "password1", None)
        .await
        .unwrap_err();
    let pending = api.begin_provisioning("a@x.com", "password1").await.unwrap();
    let code = totp::generate_current(&pending.secret_bytes).unwrap();
    assert!(
        api.commit_provisioning("a@x.com", "password1", &code, &pending.secret_bytes)
            .await
            .unwrap()
    );
    pending.secret_bytes
}

#[tokio::test]
async fn provisioned_sign_in_requires_a_current_otp() {
    let (api, _store) = spawn_app().await;
    let secret = provisioned_account(&api).await;

    // no OTP: the flow signal, not a session
    let missing = api
        .authorize(Flow::SignIn, "a@x.com", "password1", None)
        .await;
    assert_eq!(missing.unwrap_err().code(), Some(AuthErrorCode::MissingOtp));

    // wrong 6-digit code
    let wrong = wrong_code(&secret);
    let rejected = api
        .authorize(Flow::SignIn, "a@x.com", "password1", Some(&wrong))
        .await;
    assert_eq!(rejected.unwrap_err().code(), Some(AuthErrorCode::InvalidOtp));

    // a code from the previous step: verification is strict, no drift
    // window
    let stale = totp::generate_at(&secret, unix_now() - 30).unwrap();
    let rejected = api
        .authorize(Flow::SignIn, "a@x.com", "password1", Some(&stale))
        .await;
    assert_eq!(rejected.unwrap_err().code(), Some(AuthErrorCode::InvalidOtp));

    // the current code yields the principal
    let code = totp::generate_current(&secret).unwrap();
    let session = api
        .authorize(Flow::SignIn, "a@x.com", "password1", Some(&code))
        .await
        .unwrap();
    assert!(!session.user_id.to_string().is_empty());
}

#[tokio::test]
async fn verify_dialog_closes_after_a_failed_attempt() {
    let (api, _store) = spawn_app().await;
    let secret = provisioned_account(&api).await;

    let mut controller = FlowController::new(api);
    controller.submit_credentials("a@x.com", "password1").await;
    assert_eq!(
        controller.state(),
        &FlowState::AwaitingMfa {
            stage: MfaStage::Verify
        }
    );

    controller.set_otp(wrong_code(&secret));
    controller.submit_otp().await;

    // one attempt per dialog: back to the form with the error surfaced
    assert_eq!(controller.state(), &FlowState::Idle);
    assert_eq!(controller.error(), Some("Invalid OTP"));
    assert!(controller.otp().is_none());
}

#[tokio::test]
async fn duplicate_sign_up_is_a_conflict() {
    let (api, _store) = spawn_app().await;

    api.authorize(Flow::SignUp, "a@x.com", "password1", None)
        .await
        .unwrap_err();
    let again = api
        .authorize(Flow::SignUp, "a@x.com", "other-password", None)
        .await;
    assert_eq!(
        again.unwrap_err().code(),
        Some(AuthErrorCode::EmailAlreadyExists)
    );
}

#[tokio::test]
async fn short_sign_up_password_is_rejected() {
    let (api, _store) = spawn_app().await;

    let result = api.authorize(Flow::SignUp, "a@x.com", "short", None).await;
    assert_eq!(
        result.unwrap_err().code(),
        Some(AuthErrorCode::InvalidPassword)
    );
}

#[tokio::test]
async fn begin_provisioning_demands_the_password() {
    let (api, _store) = spawn_app().await;

    api.authorize(Flow::SignUp, "a@x.com", "password1", None)
        .await
        .unwrap_err();

    let refused = api.begin_provisioning("a@x.com", "wrong-password").await;
    assert_eq!(
        refused.unwrap_err().code(),
        Some(AuthErrorCode::InvalidCredentials)
    );

    let missing = api.begin_provisioning("nobody@x.com", "password1").await;
    assert_eq!(
        missing.unwrap_err().code(),
        Some(AuthErrorCode::AccountNotFound)
    );
}
