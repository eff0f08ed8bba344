use garde::Validate;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// The request payload for signing in.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

/// Validates a login payload.
///
/// # Arguments
///
/// * `payload` - The login payload.
///
/// # Returns
///
/// A `Result<()>` indicating whether the payload is valid.
pub fn validate_login(payload: &LoginRequest) -> Result<()> {
    payload
        .validate()
        .map_err(|report| AppError::Validation(report.to_string()))
}
