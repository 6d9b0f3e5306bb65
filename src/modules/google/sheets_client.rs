use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{ensure_success, transport_error, AccessTokenSource};
use crate::core::error::{AppError, Result};

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody {
    values: Vec<Vec<Value>>,
}

/// Thin client over the Sheets v4 `spreadsheets.values` endpoints
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl SheetsClient {
    pub fn new(
        base_url: &str,
        spreadsheet_id: &str,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("ApartmentReports/1.0")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            tokens,
        })
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(range),
            suffix
        )
    }

    /// Read a range, returning every cell rendered as text.
    ///
    /// Rows keep whatever length the API returns; trailing empty cells are
    /// omitted by Google, so callers must pad.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.tokens.access_token().await?;

        debug!("Sheets read: {}", range);

        let response = self
            .http
            .get(self.values_url(range, ""))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error("Sheets read", e))?;

        let body: ValueRange = ensure_success(response, "Sheets read")
            .await?
            .json()
            .await
            .map_err(|e| transport_error("Sheets read", e))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    /// Append one row after the table found at `range`
    pub async fn append_row(&self, range: &str, row: Vec<Value>) -> Result<()> {
        let token = self.tokens.access_token().await?;

        debug!("Sheets append: {}", range);

        let response = self
            .http
            .post(self.values_url(range, ":append"))
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&ValueRangeBody { values: vec![row] })
            .send()
            .await
            .map_err(|e| transport_error("Sheets append", e))?;

        ensure_success(response, "Sheets append").await?;
        Ok(())
    }

    /// Overwrite the cells of `range`
    pub async fn update_values(&self, range: &str, values: Vec<Vec<Value>>) -> Result<()> {
        let token = self.tokens.access_token().await?;

        debug!("Sheets update: {}", range);

        let response = self
            .http
            .put(self.values_url(range, ""))
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRangeBody { values })
            .send()
            .await
            .map_err(|e| transport_error("Sheets update", e))?;

        ensure_success(response, "Sheets update").await?;
        Ok(())
    }
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
