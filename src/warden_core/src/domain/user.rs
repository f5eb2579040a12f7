use crate::domain::email::Email;
use crate::domain::ids::UserId;

/// Principal identity. Created on first successful sign-up and never
/// deleted by this subsystem.
#[derive(Debug, Clone)]
pub struct User {
    user_id: UserId,
    email: Email,
}

impl User {
    pub fn new(user_id: UserId, email: Email) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }
}
