use warden_core::{AuthErrorCode, Flow, SessionPrincipal};

use crate::api::{ApiError, AuthApi, PendingTotp};

/// Which prompt the MFA dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaStage {
    /// Enrollment URI plus OTP entry: the authenticator is not set up.
    Setup,
    /// OTP entry only: the account is provisioned, a code is required.
    Verify,
}

/// Controller state.
///
/// A failed credential submit returns to `Idle` with the error message
/// surfaced through [`FlowController::error`]; that Idle-with-error pair
/// is the terminal "failed" outcome of a submission round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Submitting,
    AwaitingMfa { stage: MfaStage },
    Authenticated(SessionPrincipal),
}

/// Drives a human through sign-in -> (conditionally) MFA setup -> OTP
/// verify -> session, interpreting the structured signals returned by
/// the server.
///
/// Runs single-threaded with user-driven transitions only; there are no
/// timers or background retries. The submitted email and password are
/// held for the lifetime of one dialog so the OTP round-trips can
/// re-send them, exactly as the original form flow does.
pub struct FlowController<A>
where
    A: AuthApi,
{
    api: A,
    flow: Flow,
    state: FlowState,
    error: Option<String>,
    credentials: Option<(String, String)>,
    pending: Option<PendingTotp>,
    otp: Option<String>,
}

impl<A> FlowController<A>
where
    A: AuthApi,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            flow: Flow::SignIn,
            state: FlowState::Idle,
            error: None,
            credentials: None,
            pending: None,
            otp: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The OTP currently entered in the dialog, if any.
    pub fn otp(&self) -> Option<&str> {
        self.otp.as_deref()
    }

    /// Enrollment URI to display while the dialog is in the setup stage.
    pub fn enrollment_uri(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.uri.as_str())
    }

    pub fn set_otp(&mut self, otp: impl Into<String>) {
        self.otp = Some(otp.into());
    }

    /// Switch between sign-in and sign-up. Only honored while idle;
    /// clears any surfaced error.
    pub fn toggle_flow(&mut self) {
        if self.state != FlowState::Idle {
            return;
        }
        self.flow = match self.flow {
            Flow::SignIn => Flow::SignUp,
            Flow::SignUp => Flow::SignIn,
        };
        self.error = None;
    }

    /// Close the MFA dialog, abandoning any provisioning in flight.
    ///
    /// Nothing was persisted server-side for an uncommitted secret, so
    /// there is no cleanup call to make.
    pub fn close_dialog(&mut self) {
        if !matches!(self.state, FlowState::AwaitingMfa { .. }) {
            return;
        }
        self.pending = None;
        self.otp = None;
        self.credentials = None;
        self.state = FlowState::Idle;
    }

    /// Submit the primary credentials for the current flow.
    #[tracing::instrument(name = "FlowController::submit_credentials", skip_all)]
    pub async fn submit_credentials(&mut self, email: impl Into<String>, password: impl Into<String>) {
        let email = email.into();
        let password = password.into();

        self.state = FlowState::Submitting;
        self.error = None;

        let outcome = self
            .api
            .authorize(self.flow, &email, &password, None)
            .await;

        match outcome {
            Ok(principal) => {
                self.credentials = None;
                self.state = FlowState::Authenticated(principal);
            }
            Err(error) => match error.code() {
                Some(AuthErrorCode::MfaNotSetup) => {
                    self.begin_setup(email, password).await;
                }
                Some(AuthErrorCode::MissingOtp) => {
                    self.credentials = Some((email, password));
                    self.state = FlowState::AwaitingMfa {
                        stage: MfaStage::Verify,
                    };
                }
                _ => {
                    self.error = Some(error.to_string());
                    self.state = FlowState::Idle;
                }
            },
        }
    }

    /// Submit the OTP entered in the dialog.
    #[tracing::instrument(name = "FlowController::submit_otp", skip_all)]
    pub async fn submit_otp(&mut self) {
        let FlowState::AwaitingMfa { stage } = self.state else {
            return;
        };
        let Some(otp) = self.otp.clone() else {
            return;
        };
        let Some((email, password)) = self.credentials.clone() else {
            return;
        };

        match stage {
            MfaStage::Setup => self.commit_and_sign_in(email, password, otp).await,
            MfaStage::Verify => self.verify_sign_in(email, password, otp).await,
        }
    }

    async fn begin_setup(&mut self, email: String, password: String) {
        match self.api.begin_provisioning(&email, &password).await {
            Ok(pending) => {
                self.pending = Some(pending);
                self.credentials = Some((email, password));
                self.state = FlowState::AwaitingMfa {
                    stage: MfaStage::Setup,
                };
            }
            Err(error) => {
                self.error = Some(error.to_string());
                self.state = FlowState::Idle;
            }
        }
    }

    /// Setup stage: commit the candidate secret, then sign in reusing
    /// the same still-current OTP. On failure the dialog stays open
    /// against the same un-regenerated secret; a time-expired code
    /// simply fails verification again.
    async fn commit_and_sign_in(&mut self, email: String, password: String, otp: String) {
        let Some(pending) = self.pending.clone() else {
            self.error = Some("Secret bytes not available".to_string());
            return;
        };

        let committed = self
            .api
            .commit_provisioning(&email, &password, &otp, &pending.secret_bytes)
            .await;

        match committed {
            Ok(true) => {
                let signed_in = self
                    .api
                    .authorize(Flow::SignIn, &email, &password, Some(otp.as_str()))
                    .await;
                match signed_in {
                    Ok(principal) => {
                        self.pending = None;
                        self.otp = None;
                        self.credentials = None;
                        self.state = FlowState::Authenticated(principal);
                    }
                    Err(error) => {
                        self.otp = None;
                        self.error = Some(error.to_string());
                    }
                }
            }
            Ok(false) => {
                self.otp = None;
                self.error = Some("Invalid OTP".to_string());
            }
            Err(error) => {
                self.otp = None;
                self.error = Some(error.to_string());
            }
        }
    }

    /// Verify stage: one attempt per dialog. A failure clears the OTP,
    /// surfaces the error and closes the dialog; the user re-submits
    /// their primary credentials to try again.
    async fn verify_sign_in(&mut self, email: String, password: String, otp: String) {
        let outcome = self
            .api
            .authorize(Flow::SignIn, &email, &password, Some(otp.as_str()))
            .await;

        match outcome {
            Ok(principal) => {
                self.otp = None;
                self.credentials = None;
                self.state = FlowState::Authenticated(principal);
            }
            Err(error) => {
                self.otp = None;
                self.error = Some(error.to_string());
                self.pending = None;
                self.credentials = None;
                self.state = FlowState::Idle;
            }
        }
    }
}
