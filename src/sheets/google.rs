use anyhow::{anyhow, Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::debug;

use super::{Grid, SheetStore};

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Grid,
}

fn values_url(spreadsheet_id: &str, name: &str, suffix: &str) -> String {
    format!(
        "{}/{}/values/{}{}",
        SHEETS_ENDPOINT,
        spreadsheet_id,
        urlencoding::encode(name),
        suffix
    )
}

/// Google Sheets v4 values API, authenticated with an OAuth access token.
pub struct GoogleSheetsStore {
    client: reqwest::Client,
    spreadsheet_id: String,
    access_token: String,
}

impl GoogleSheetsStore {
    pub fn new(spreadsheet_id: &str, access_token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("clan-rating/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create Google Sheets client")?;
        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn values_url(&self, name: &str, suffix: &str) -> String {
        values_url(&self.spreadsheet_id, name, suffix)
    }

    async fn send(&self, request: reqwest::RequestBuilder, name: &str) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| anyhow!("Google Sheets request failed: {}", e))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(anyhow!(
                "Google Sheets authentication failed. The access token may be invalid or expired."
            )),
            StatusCode::FORBIDDEN => Err(anyhow!(
                "No access to spreadsheet {}. Share it with the token's account.",
                self.spreadsheet_id
            )),
            StatusCode::NOT_FOUND => Err(anyhow!("Sheet '{}' not found", name)),
            status => Err(anyhow!("Google Sheets error {} for sheet '{}'", status, name)),
        }
    }

    async fn retry<F, Fut, T>(&self, action: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(std::time::Duration::from_secs(5))
            .take(3);
        Retry::spawn(retry_strategy, action).await
    }
}

impl SheetStore for GoogleSheetsStore {
    async fn read_sheet(&self, name: &str) -> Result<Grid> {
        let url = self.values_url(name, "");
        let range: ValueRange = self
            .retry(|| async {
                self.send(self.client.get(&url), name)
                    .await?
                    .json::<ValueRange>()
                    .await
                    .with_context(|| format!("Unexpected response format for sheet '{}'", name))
            })
            .await?;
        debug!("Read {} rows from sheet '{}'", range.values.len(), name);
        Ok(range.values)
    }

    async fn write_sheet(&self, name: &str, grid: &Grid) -> Result<()> {
        let clear_url = self.values_url(name, ":clear");
        self.retry(|| async {
            self.send(self.client.post(&clear_url).json(&json!({})), name)
                .await
                .map(|_| ())
        })
        .await
        .with_context(|| format!("Failed to clear sheet '{}'", name))?;

        let update_url = format!("{}?valueInputOption=RAW", self.values_url(name, ""));
        let body = json!({ "range": name, "majorDimension": "ROWS", "values": grid });
        self.retry(|| async {
            self.send(self.client.put(&update_url).json(&body), name)
                .await
                .map(|_| ())
        })
        .await
        .with_context(|| format!("Failed to update sheet '{}'", name))?;

        debug!("Wrote {} rows to sheet '{}'", grid.len(), name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url_encodes_sheet_name() {
        assert_eq!(
            values_url("abc123", "player ranking", ":clear"),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/player%20ranking:clear"
        );
    }

    #[test]
    fn test_missing_values_read_as_empty() {
        let range: ValueRange = serde_json::from_str(r#"{"range": "excuses!A1:Z1000"}"#).unwrap();
        assert!(range.values.is_empty());
    }
}
