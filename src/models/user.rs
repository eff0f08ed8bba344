use serde::{Deserialize, Serialize};

use crate::models::role::Role;

/// The profile of the signed-in user, as returned by the backend.
///
/// Replaced wholesale on login and on profile refresh; never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The backend's identifier for the user.
    pub id: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's role.
    pub role: Role,
    /// The account status reported by the backend (`active`, `inactive`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
