use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a user holds in a home's OFSTED Prep workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user management and settings.
    Admin,
    /// Day-to-day care staff.
    Staff,
    /// Inspectors and managers who only read compliance data.
    Readonly,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Readonly];

    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Readonly => "readonly",
        }
    }

    /// Returns the page a user with this role lands on after signing in.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Admin => "/",
            Role::Staff => "/staff-compliance",
            Role::Readonly => "/reports",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "readonly" => Ok(Role::Readonly),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
