use crate::domain::email::Email;
use crate::domain::flow::Flow;
use crate::domain::otp_code::OtpCode;
use crate::domain::password::Password;

/// One authorization request, fully consumed by a single
/// `authorize` call. Has no identity beyond that exchange.
#[derive(Debug, Clone)]
pub struct AuthenticationAttempt {
    pub flow: Flow,
    pub email: Email,
    pub password: Password,
    pub otp: Option<OtpCode>,
}

impl AuthenticationAttempt {
    pub fn new(flow: Flow, email: Email, password: Password, otp: Option<OtpCode>) -> Self {
        Self {
            flow,
            email,
            password,
            otp,
        }
    }
}
