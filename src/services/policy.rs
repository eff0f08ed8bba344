//! Static mapping from capability to the roles allowed to use it.
//!
//! Lookups fail closed: an unknown capability or an absent role is never
//! allowed.

use crate::models::{capability::Capability, role::Role};

const EVERYONE: &[Role] = &[Role::Admin, Role::Staff, Role::Readonly];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_AND_READONLY: &[Role] = &[Role::Admin, Role::Readonly];

/// Returns the allow-list for a capability.
pub fn allowed_roles(capability: Capability) -> &'static [Role] {
    match capability {
        Capability::Dashboard
        | Capability::AuditChecklist
        | Capability::StaffCompliance
        | Capability::Policies
        | Capability::Alerts
        | Capability::Profile => EVERYONE,
        Capability::Reports => ADMIN_AND_READONLY,
        Capability::Settings | Capability::UserManagement | Capability::ActivityLogs => {
            ADMIN_ONLY
        }
    }
}

/// Returns `true` if `role` is a member of `allowed`.
pub fn has_role(role: Option<Role>, allowed: &[Role]) -> bool {
    role.is_some_and(|r| allowed.contains(&r))
}

/// Returns `true` if `role` may use `capability`.
pub fn is_allowed(role: Option<Role>, capability: Capability) -> bool {
    has_role(role, allowed_roles(capability))
}

/// String form of [`is_allowed`] for callers holding raw names.
///
/// Unknown role strings and unknown capability names are refused.
pub fn is_allowed_by_name(role: &str, capability: &str) -> bool {
    let Some(capability) = Capability::from_name(capability) else {
        tracing::debug!("Unknown capability requested: {}", capability);
        return false;
    };

    is_allowed(role.parse().ok(), capability)
}
