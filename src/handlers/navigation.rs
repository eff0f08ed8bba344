use axum::{extract::Query, Extension, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    services::{navigation::NavigationShell, session_context::SessionContext},
};

/// The query parameters for the navigation endpoint.
#[derive(Deserialize)]
pub struct NavigationQuery {
    /// The page the client is on, used to mark the active link.
    #[serde(default)]
    pub path: Option<String>,
}

/// Returns the sidebar links visible to the current user.
pub async fn navigation(
    Extension(context): Extension<SessionContext>,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<NavigationShell>> {
    let role = context
        .role()
        .ok_or_else(|| AppError::Authentication("Not signed in".to_string()))?;

    let current_path = query.path.as_deref().unwrap_or("/");
    Ok(Json(NavigationShell::for_role(role, current_path)))
}
