use serde::{Deserialize, Serialize};

use crate::models::{role::Role, user::UserProfile};

/// Represents a signed-in session.
///
/// The token and the profile only ever exist together: a half-written
/// session in storage reads back as no session at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The opaque bearer token issued by the backend.
    pub token: String,
    /// The cached profile of the signed-in user.
    pub user: UserProfile,
}

impl Session {
    /// Returns the role of the signed-in user.
    pub fn role(&self) -> Role {
        self.user.role
    }
}
