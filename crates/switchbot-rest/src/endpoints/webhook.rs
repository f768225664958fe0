//! Webhook endpoints
//!
//! All webhook calls are POSTs whose body is tagged by `action`.

use tracing::instrument;

use super::require_non_empty;
use crate::client::{api_path, SwitchBotClient};
use crate::codec::Codec;
use crate::error::{RestError, RestResult};
use crate::types::{
    WebhookConfig, WebhookDetails, WebhookRequest, WebhookUrls, WEBHOOK_DEVICE_LIST_ALL,
};

/// Webhook configuration
pub struct WebhookEndpoints<'a, C> {
    client: &'a SwitchBotClient<C>,
}

impl<'a, C: Codec> WebhookEndpoints<'a, C> {
    pub fn new(client: &'a SwitchBotClient<C>) -> Self {
        Self { client }
    }

    /// Register a URL to receive events from all devices
    #[instrument(skip(self))]
    pub async fn setup(&self, url: &str) -> RestResult<()> {
        require_non_empty(url, "webhook URL")?;

        let request = WebhookRequest::Setup {
            url: url.to_string(),
            device_list: WEBHOOK_DEVICE_LIST_ALL.to_string(),
        };
        self.client
            .post(&api_path("webhook/setupWebhook"), Some(&request))
            .await?;
        Ok(())
    }

    /// List configured URLs
    #[instrument(skip(self))]
    pub async fn query_urls(&self) -> RestResult<Vec<String>> {
        let envelope = self
            .client
            .post(&api_path("webhook/queryWebhook"), Some(&WebhookRequest::QueryUrl))
            .await?;
        let urls: WebhookUrls = envelope.decode_body("webhook URL list")?;
        Ok(urls.urls)
    }

    /// Get configuration details for the given URLs
    #[instrument(skip(self))]
    pub async fn query_details(&self, urls: &[&str]) -> RestResult<Vec<WebhookDetails>> {
        if urls.is_empty() {
            return Err(RestError::InvalidParameter(
                "at least one URL must be provided for queryDetails".to_string(),
            ));
        }

        let request = WebhookRequest::QueryDetails {
            urls: urls.iter().map(|u| u.to_string()).collect(),
        };
        let envelope = self
            .client
            .post(&api_path("webhook/queryWebhook"), Some(&request))
            .await?;
        envelope.decode_body("webhook details")
    }

    /// Enable or disable a URL
    #[instrument(skip(self))]
    pub async fn update(&self, url: &str, enable: bool) -> RestResult<()> {
        require_non_empty(url, "webhook URL")?;

        let request = WebhookRequest::Update {
            config: WebhookConfig {
                url: url.to_string(),
                enable,
            },
        };
        self.client
            .post(&api_path("webhook/updateWebhook"), Some(&request))
            .await?;
        Ok(())
    }

    /// Remove a URL
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> RestResult<()> {
        require_non_empty(url, "webhook URL")?;

        let request = WebhookRequest::Delete {
            url: url.to_string(),
        };
        self.client
            .post(&api_path("webhook/deleteWebhook"), Some(&request))
            .await?;
        Ok(())
    }
}
