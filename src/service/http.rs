// HTTP client for the review generation service

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::retry::with_retry;
use super::types::{error_message, CapabilitiesResponse, GenerateRequest, ImproveRequest};
use super::ReviewService;
use crate::catalog::CapabilityCatalog;
use crate::config::Config;
use crate::document::ReviewDocument;
use crate::errors::ServiceError;

pub struct HttpReviewService {
    client: Client,
    base_url: String,
    max_attempts: u32,
}

impl HttpReviewService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_attempts: 1,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Ok(Self::new(&config.api_base_url, config.request_timeout())?
            .with_max_attempts(config.max_retries))
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + std::fmt::Debug,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!("POST {}: {:?}", url, body);

        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))?;

    if !status.is_success() {
        let fallback = status.canonical_reason().unwrap_or("request failed");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            message: error_message(&body, fallback),
        });
    }

    serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}

#[async_trait]
impl ReviewService for HttpReviewService {
    async fn fetch_capabilities(&self) -> Result<CapabilityCatalog, ServiceError> {
        let response: CapabilitiesResponse =
            with_retry(self.max_attempts, || self.get_json("capabilities")).await?;
        tracing::debug!("Fetched {} capabilities", response.capabilities.len());
        Ok(response.capabilities)
    }

    async fn generate_review(
        &self,
        request: &GenerateRequest,
    ) -> Result<ReviewDocument, ServiceError> {
        with_retry(self.max_attempts, || self.post_json("generate-review", request)).await
    }

    async fn improve_review(&self, request: &ImproveRequest) -> Result<ReviewDocument, ServiceError> {
        with_retry(self.max_attempts, || self.post_json("improve-review", request)).await
    }
}
