//! Google API clients used by the remote storage backends
//!
//! - `auth`: service-account token exchange and caching
//! - `sheets_client`: Sheets v4 values read/append/update
//! - `drive_client`: Drive v3 upload and public sharing

mod auth;
mod drive_client;
mod sheets_client;

pub use auth::{
    AccessTokenSource, ServiceAccountTokenManager, SCOPE_DRIVE, SCOPE_SPREADSHEETS,
};
pub use drive_client::DriveClient;
pub use sheets_client::SheetsClient;

#[cfg(test)]
pub use auth::StaticTokenSource;

use crate::core::error::{AppError, Result};

/// Turn a non-2xx Google API response into an `ExternalServiceError`
async fn ensure_success(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::ExternalServiceError(format!(
        "{} failed: HTTP {} - {}",
        action, status, body
    )))
}

fn transport_error(action: &str, e: reqwest::Error) -> AppError {
    AppError::ExternalServiceError(format!("{} failed: {}", action, e))
}
