use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use tower_cookies::Key;

use crate::services::session_store::CookieSettings;

/// Login rate limit applied per client IP.
#[derive(Clone, Copy, Debug)]
pub struct LoginRateLimit {
    /// Seconds between replenished attempts.
    pub period_secs: u64,
    /// Attempts allowed in a burst.
    pub burst_size: u32,
}

/// The shortest accepted `SESSION_SECRET`, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

/// Builds the cookie signing key from a secret string.
pub fn session_key_from_secret(secret: &str) -> Result<Key> {
    if secret.len() < MIN_SESSION_SECRET_LEN {
        return Err(anyhow!(
            "SESSION_SECRET must be at least {} bytes",
            MIN_SESSION_SECRET_LEN
        ));
    }

    Key::try_from(secret.as_bytes()).map_err(|e| anyhow!("Invalid SESSION_SECRET: {}", e))
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The address the server listens on.
    pub bind_address: SocketAddr,
    /// The base URL of the REST backend.
    pub backend_url: Url,
    /// The lifetime of the session cookies in days.
    pub session_duration_days: i64,
    /// The key session cookies are signed with.
    pub session_key: Key,
    /// Whether session cookies are marked `Secure`.
    pub secure_cookies: bool,
    /// The login rate limit, or `None` when disabled.
    pub login_rate_limit: Option<LoginRateLimit>,
    /// Origins allowed to call the API cross-site.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("BACKEND_URL").context("BACKEND_URL must be set")?;
        let backend_url = Url::parse(&backend_url).context("BACKEND_URL must be a valid URL")?;

        let is_production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string()) == "production";

        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        let session_key = session_key_from_secret(&session_secret)?;

        let period_secs: u64 = env::var("LOGIN_RATE_LIMIT_PERIOD_SECS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .context("Invalid LOGIN_RATE_LIMIT_PERIOD_SECS")?;
        let burst_size: u32 = env::var("LOGIN_RATE_LIMIT_BURST")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("Invalid LOGIN_RATE_LIMIT_BURST")?;

        let login_rate_limit = (period_secs > 0 && burst_size > 0).then_some(LoginRateLimit {
            period_secs,
            burst_size,
        });

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDRESS")?,
            backend_url,
            session_duration_days: env::var("SESSION_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_DAYS")?,
            session_key,
            secure_cookies: is_production,
            login_rate_limit,
            cors_origins,
        })
    }

    /// Returns the attributes applied to session cookies.
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            max_age_days: self.session_duration_days,
            secure: self.secure_cookies,
        }
    }
}
