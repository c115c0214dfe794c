//! HTTP client for the storefront promo endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::PromoApiConfig;

use super::service::{PromoService, PromoServiceError, PromoValidation};

/// [`PromoService`] backed by the storefront's JSON API.
#[derive(Debug, Clone)]
pub struct HttpPromoService {
    config: PromoApiConfig,
    http: Client,
}

#[derive(Debug, Serialize)]
struct CodeRequest<'a> {
    code: &'a str,
}

impl HttpPromoService {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: PromoApiConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(config: PromoApiConfig, http: Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl PromoService for HttpPromoService {
    async fn validate(&self, code: &str) -> Result<PromoValidation, PromoServiceError> {
        let url = self.config.validate_url();

        let response = self
            .http
            .post(&url)
            .json(&CodeRequest { code })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(PromoServiceError::UnexpectedResponse(format!(
                "validate request failed with status {status}: {text}"
            )));
        }

        let parsed: PromoValidation = response.json().await?;

        debug!(valid = parsed.valid, "promo code validated");

        Ok(parsed)
    }

    async fn mark_used(&self, code: &str) -> Result<(), PromoServiceError> {
        let url = self.config.mark_used_url();

        let response = self
            .http
            .post(&url)
            .json(&CodeRequest { code })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(PromoServiceError::UnexpectedResponse(format!(
                "mark-used request failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}
