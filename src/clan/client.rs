use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

/// RoyaleAPI proxy; the official endpoint only accepts whitelisted IPs.
pub const DEFAULT_API_ENDPOINT: &str = "https://proxy.royaleapi.dev/v1";

/// Create an authenticated game API client using an API token
pub fn create_client(token: &str) -> Result<reqwest::Client> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .context("API token contains characters not allowed in a header")?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("clan-rating/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create game API client")
}
