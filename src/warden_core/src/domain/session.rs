use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;

/// The minimal authenticated identity returned by a successful
/// authorization, handed to the external session-issuance collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPrincipal {
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

impl SessionPrincipal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
