//! Per-navigation access decision.

use crate::{
    models::capability::Capability,
    services::{policy, session_context::SessionContext},
};

/// Where unauthenticated navigations are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated but forbidden navigations are sent.
pub const LANDING_PATH: &str = "/";

/// The outcome of guarding a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// No valid session.
    RedirectToLogin,
    /// Valid session, but the role may not use the capability.
    RedirectToLanding,
    /// Valid session and the role is allowed.
    Render,
}

impl GuardDecision {
    /// Returns the redirect target, or `None` when the page may render.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToLanding => Some(LANDING_PATH),
            GuardDecision::Render => None,
        }
    }
}

/// Decides whether the navigation to `capability` may render.
pub fn evaluate(context: &SessionContext, capability: Capability) -> GuardDecision {
    let Some(role) = context.role() else {
        return GuardDecision::RedirectToLogin;
    };

    if policy::is_allowed(Some(role), capability) {
        GuardDecision::Render
    } else {
        GuardDecision::RedirectToLanding
    }
}
