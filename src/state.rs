use crate::config::Config;
use crate::error::Result;
use crate::services::backend::BackendClient;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The REST backend client.
    pub backend: BackendClient,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let backend = BackendClient::new(config.backend_url.clone())?;
        tracing::info!("✅ Backend client initialized for {}", config.backend_url);

        Ok(AppState {
            config: config.clone(),
            backend,
        })
    }
}
