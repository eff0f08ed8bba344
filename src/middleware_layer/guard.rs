use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::{
    models::capability::Capability,
    services::{
        guard::{self, GuardDecision},
        session_context::SessionContext,
    },
};

/// A middleware that lets a page render only for roles allowed to see it.
///
/// Attached per route with the page's capability as middleware state.
/// Refused navigations are answered with a redirect, never an error.
pub async fn require_capability(
    State(capability): State<Capability>,
    Extension(context): Extension<SessionContext>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let decision = guard::evaluate(&context, capability);

    match decision {
        GuardDecision::Render => next.run(request).await,
        GuardDecision::RedirectToLogin => {
            tracing::debug!("🔐 {} requires a session, redirecting to login", capability.name());
            Redirect::to(guard::LOGIN_PATH).into_response()
        }
        GuardDecision::RedirectToLanding => {
            tracing::warn!(
                "⛔ Role {:?} may not open {}, redirecting to landing page",
                context.role(),
                capability.name()
            );
            Redirect::to(guard::LANDING_PATH).into_response()
        }
    }
}
