use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{AppError, Result},
    models::{role::Role, user::UserProfile},
};

/// Message shown when the backend refuses a login without saying why.
const DEFAULT_LOGIN_ERROR: &str = "Invalid email or password";
/// Timeout applied to every backend request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The successful answer to a login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// The profile payload served by `GET /profile/{id}`.
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    name: String,
    email: String,
    role: Role,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct BackendMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the OFSTED Prep REST backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates a new `BackendClient` rooted at `base_url`.
    pub fn new(base_url: Url) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AppError::Backend)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Returns the download link of a policy document.
    pub fn document_url(&self, file_name: &str) -> Result<Url> {
        self.endpoint(&["documents", "policies", file_name])
    }

    /// Exchanges credentials for a token and profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.endpoint(&["auth", "login"])?;
        tracing::debug!("Forwarding login for {} to backend", email);

        let response = self
            .http
            .post(url)
            .json(&LoginBody { email, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let message = rejection_message(response)
                .await
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string());
            return Err(AppError::Authentication(message));
        }

        let response = response.error_for_status()?;
        Ok(response.json::<LoginResponse>().await?)
    }

    /// Fetches the current profile of `user_id` with the session token.
    ///
    /// Returns `AppError::SessionExpired` when the backend rejects the token.
    pub async fn fetch_profile(&self, token: &str, user_id: &str) -> Result<UserProfile> {
        let url = self.endpoint(&["profile", user_id])?;

        let response = self.http.get(url).bearer_auth(token).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(AppError::SessionExpired),
            StatusCode::NOT_FOUND => return Err(AppError::NotFound),
            _ => {}
        }

        let profile = response
            .error_for_status()?
            .json::<ProfileResponse>()
            .await?;

        Ok(UserProfile {
            id: user_id.to_string(),
            name: profile.name,
            email: profile.email,
            role: profile.role,
            status: profile.status,
        })
    }
}

async fn rejection_message(response: reqwest::Response) -> Option<String> {
    let body = response.json::<BackendMessage>().await.ok()?;
    body.message.or(body.error).filter(|m| !m.trim().is_empty())
}
