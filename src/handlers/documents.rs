use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::{
    error::{AppError, Result},
    state::AppState,
};

/// Redirects to a policy document served by the backend.
pub async fn policy_document(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Redirect> {
    if file_name.trim().is_empty() || file_name == "." || file_name == ".." {
        return Err(AppError::Validation("Invalid document name".to_string()));
    }

    let url = state.backend.document_url(&file_name)?;
    tracing::debug!("📄 Policy document {} -> {}", file_name, url);

    Ok(Redirect::to(url.as_str()))
}
