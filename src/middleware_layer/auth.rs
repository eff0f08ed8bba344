use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    services::{
        session_context::SessionContext,
        session_store::{CookieStorage, SessionStore},
    },
    state::AppState,
};

/// Opens the session store backed by the request's cookies.
pub fn cookie_session_store(state: &AppState, cookies: Cookies) -> SessionStore<CookieStorage> {
    SessionStore::new(CookieStorage::new(
        cookies,
        state.config.session_key.clone(),
        state.config.cookie_settings(),
    ))
}

/// A middleware that reads the session once and shares it with the request.
///
/// Inserts a [`SessionContext`] into the request extensions; it is anonymous
/// when the cookies hold no valid session.
pub async fn load_session(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let store = cookie_session_store(&state, cookies);
    let context = SessionContext::load(&store);

    match context.user() {
        Some(user) => tracing::debug!("🔑 Session for user {} ({})", user.id, user.role),
        None => tracing::debug!("🔑 Anonymous request"),
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// A middleware that rejects API calls made without a session.
pub async fn require_session(
    Extension(context): Extension<SessionContext>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !context.is_authenticated() {
        tracing::warn!("❌ API call without a session: {}", request.uri().path());
        return AppError::Authentication("Not signed in".to_string()).into_response();
    }

    next.run(request).await
}
