use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    handlers::pages::render_document,
    middleware_layer::auth::cookie_session_store,
    models::{capability::Capability, role::Role, user::UserProfile},
    services::{
        backend::LoginResponse, guard::LOGIN_PATH, policy, session_context::SessionContext,
    },
    state::AppState,
    validation::auth::{validate_login, LoginRequest},
};

/// The response payload for a successful login.
#[derive(Serialize)]
pub struct LoginSuccess {
    pub success: bool,
    pub message: String,
    /// The page the client should navigate to next.
    pub redirect: &'static str,
    pub user: UserProfile,
}

/// The response payload describing the current session.
#[derive(Serialize)]
pub struct SessionInfo {
    pub user: UserProfile,
    /// The pages the user's role may open, in route order.
    pub capabilities: Vec<Capability>,
}

impl SessionInfo {
    fn for_user(user: UserProfile) -> Self {
        let role = user.role;
        Self {
            user,
            capabilities: allowed_capabilities(role),
        }
    }
}

fn allowed_capabilities(role: Role) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|c| policy::is_allowed(Some(role), *c))
        .collect()
}

const LOGIN_FORM: &str = r#"<header>
<h1>Login</h1>
<p>Access your OFSTED account</p>
</header>
<form id="login-form">
<label for="email">Email</label>
<input id="email" name="email" type="email" placeholder="Enter your email" required>
<label for="password">Password</label>
<input id="password" name="password" type="password" placeholder="Enter your password" required>
<button type="submit">Sign In</button>
<p id="login-error" role="alert"></p>
</form>
<script>
document.getElementById("login-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = event.target;
  const response = await fetch("/api/auth/login", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ email: form.email.value, password: form.password.value }),
  });
  const body = await response.json();
  if (response.ok) {
    window.location.replace(body.redirect);
  } else {
    document.getElementById("login-error").textContent = body.error || "Invalid email or password";
  }
});
</script>"#;

/// Serves the login page.
pub async fn login_page(Extension(context): Extension<SessionContext>) -> Html<String> {
    Html(render_document(&context, LOGIN_PATH, "Login", LOGIN_FORM))
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Extension(mut context): Extension<SessionContext>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    validate_login(&payload)?;
    tracing::info!("🔐 Login attempt for: {}", payload.email);

    let LoginResponse { token, user } = state
        .backend
        .login(&payload.email, &payload.password)
        .await?;

    if token.is_empty() {
        return Err(AppError::Internal("Backend issued an empty token".to_string()));
    }

    let store = cookie_session_store(&state, cookies);
    store.set_session(&token, &user)?;
    context.refresh(&store);

    let user = context
        .user()
        .cloned()
        .ok_or_else(|| AppError::Internal("Session did not persist".to_string()))?;

    tracing::info!("✅ User logged in: {} ({})", user.id, user.role);

    let response = LoginSuccess {
        success: true,
        message: format!("Welcome back, {}!", user.name),
        redirect: user.role.landing_path(),
        user,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles user logout.
///
/// Clearing an already empty session is a no-op; the redirect happens either way.
pub async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
    cookies: Cookies,
) -> Redirect {
    let store = cookie_session_store(&state, cookies);
    store.clear_session();

    match context.user() {
        Some(user) => tracing::info!("👋 User logged out: {}", user.id),
        None => tracing::debug!("👋 Logout without a session"),
    }

    Redirect::to(LOGIN_PATH)
}

/// Returns the current session's profile and permitted pages.
pub async fn current_session(
    Extension(context): Extension<SessionContext>,
) -> Result<Json<SessionInfo>> {
    let user = context
        .user()
        .cloned()
        .ok_or_else(|| AppError::Authentication("Not signed in".to_string()))?;

    Ok(Json(SessionInfo::for_user(user)))
}

/// Re-fetches the profile from the backend and replaces the stored one.
///
/// A token the backend no longer accepts ends the session.
#[axum::debug_handler]
pub async fn refresh_profile(
    State(state): State<AppState>,
    Extension(mut context): Extension<SessionContext>,
    cookies: Cookies,
) -> Result<Json<SessionInfo>> {
    let session = context
        .session()
        .cloned()
        .ok_or_else(|| AppError::Authentication("Not signed in".to_string()))?;

    let store = cookie_session_store(&state, cookies);

    let user = match state
        .backend
        .fetch_profile(&session.token, &session.user.id)
        .await
    {
        Ok(user) => user,
        Err(AppError::SessionExpired) => {
            tracing::info!("⌛ Token rejected for user {}, clearing session", session.user.id);
            store.clear_session();
            return Err(AppError::SessionExpired);
        }
        Err(e) => return Err(e),
    };

    store.set_session(&session.token, &user)?;
    context.refresh(&store);

    let user = context
        .user()
        .cloned()
        .ok_or_else(|| AppError::Internal("Session did not persist".to_string()))?;

    tracing::info!("✅ Profile refreshed for user: {}", user.id);

    Ok(Json(SessionInfo::for_user(user)))
}
