use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Requested operation mode for an authorization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    #[serde(rename = "signUp")]
    SignUp,
    #[serde(rename = "signIn")]
    SignIn,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported flow `{0}`, it must be one of \"signUp\" or \"signIn\"")]
pub struct UnsupportedFlowError(pub String);

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::SignUp => "signUp",
            Flow::SignIn => "signIn",
        }
    }
}

impl TryFrom<&str> for Flow {
    type Error = UnsupportedFlowError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "signUp" => Ok(Flow::SignUp),
            "signIn" => Ok(Flow::SignIn),
            other => Err(UnsupportedFlowError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
