use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ErrorBody;
use crate::risk::{OverviewResponse, ResidualResponse, RiskRequest, RiskResponse};
use crate::server::{CALCULATE_PATH, OVERVIEW_PATH, RESIDUAL_PATH};

/// Typed client for a running risk service
pub struct RiskClient {
    base_url: String,
    client: Client,
}

impl RiskClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn calculate(&self, request: &RiskRequest) -> Result<RiskResponse> {
        let url = self.url(CALCULATE_PATH);
        crate::log_debug!("Posting risk request for {} to {}", request.asset_id, url);
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;
        decode(response).await
    }

    pub async fn overview(&self) -> Result<OverviewResponse> {
        self.get_json(OVERVIEW_PATH).await
    }

    pub async fn residual(&self) -> Result<ResidualResponse> {
        self.get_json(RESIDUAL_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .context("Failed to parse response body");
    }

    let body = response.text().await.unwrap_or_default();
    crate::log_error!("Request failed with status: {}", status);

    if status == StatusCode::BAD_REQUEST {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|err| err.error)
            .unwrap_or(body);
        Err(anyhow!("Rejected request: {message}"))
    } else {
        Err(anyhow!("Request failed with status: {status} - {body}"))
    }
}
