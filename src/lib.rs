use axum::{
    Extension, Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use http::{Method, header};
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod error;
pub mod state;

pub mod models {
    pub mod capability;
    pub mod role;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod backend;
    pub mod guard;
    pub mod navigation;
    pub mod policy;
    pub mod session_context;
    pub mod session_store;
}

pub mod handlers {
    pub mod auth;
    pub mod documents;
    pub mod navigation;
    pub mod pages;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod guard;
}

pub mod validation {
    pub mod auth;
}

use models::capability::Capability;
use services::session_context::SessionContext;
use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the application router.
///
/// Every page route is guarded by its capability; the session is read once
/// per request by the `load_session` middleware.
pub fn build_router(state: AppState) -> Router {
    let mut page_routes: Router<AppState> = Router::new();
    for capability in Capability::ALL {
        page_routes = page_routes.route(
            capability.path(),
            get(move |Extension(context): Extension<SessionContext>| async move {
                handlers::pages::render_page(capability, &context)
            })
            .route_layer(from_fn_with_state(
                capability,
                middleware_layer::guard::require_capability,
            )),
        );
    }

    let document_routes = Router::new().route(
        "/documents/policies/{file_name}",
        get(handlers::documents::policy_document).route_layer(from_fn_with_state(
            Capability::Policies,
            middleware_layer::guard::require_capability,
        )),
    );

    let public_routes = Router::new()
        .route("/login", get(handlers::auth::login_page))
        .route("/api/auth/logout", post(handlers::auth::logout));

    let mut login_routes = Router::new().route("/api/auth/login", post(handlers::auth::login));
    if let Some(limit) = state.config.login_rate_limit {
        match GovernorConfigBuilder::default()
            .per_second(limit.period_secs)
            .burst_size(limit.burst_size)
            .finish()
        {
            Some(conf) => {
                login_routes = login_routes.layer(GovernorLayer::new(Arc::new(conf)));
                tracing::info!(
                    "✅ Login rate limit: burst {} every {}s",
                    limit.burst_size,
                    limit.period_secs
                );
            }
            None => tracing::warn!("⚠️ Invalid login rate limit, login is not rate limited"),
        }
    }

    let api_routes = Router::new()
        .route("/api/session", get(handlers::auth::current_session))
        .route("/api/auth/refresh", post(handlers::auth::refresh_profile))
        .route("/api/navigation", get(handlers::navigation::navigation))
        .route_layer(from_fn(middleware_layer::auth::require_session));

    Router::new()
        .merge(page_routes)
        .merge(document_routes)
        .merge(public_routes)
        .merge(login_routes)
        .merge(api_routes)
        .fallback(handlers::pages::not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::load_session,
        ))
        .layer(CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
