//! Main REST client implementation
//!
//! Every call goes through [`SwitchBotClient::execute`]: resolve the path,
//! encode the body, sign, dispatch, decode the envelope, classify.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Serialize;
use switchbot_auth::{attach_headers, Credentials};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

use crate::classify::classify;
use crate::codec::{Codec, JsonCodec};
use crate::endpoints::{DeviceEndpoints, SceneEndpoints, WebhookEndpoints};
use crate::error::{ApiError, ApiErrorCause, RestError, RestResult};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
use crate::types::{
    CommandResponse, DeviceCommand, DeviceList, DeviceStatus, Envelope, Scene, WebhookDetails,
};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.switch-bot.com";

/// API version path segment
pub const API_VERSION: &str = "v1.1";

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent
const DEFAULT_USER_AGENT: &str = concat!("switchbot-rest/", env!("CARGO_PKG_VERSION"));

/// SwitchBot REST API client
///
/// Cheap to clone; clones share credentials, transport and codec.
///
/// # Example
///
/// ```no_run
/// use switchbot_rest::SwitchBotClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SwitchBotClient::from_env()?;
///
///     let devices = client.get_devices().await?;
///     for device in &devices.device_list {
///         println!("{} ({})", device.device_name, device.device_type);
///     }
///
///     Ok(())
/// }
/// ```
pub struct SwitchBotClient<C = JsonCodec> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    credentials: Credentials,
    base_url: Url,
    transport: Arc<dyn Transport>,
    codec: C,
}

impl SwitchBotClient<JsonCodec> {
    /// Create a client for the production API
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> RestResult<Self> {
        let credentials = Credentials::new(token, secret)?;
        Self::with_config(ClientConfig::new().with_credentials(credentials))
    }

    /// Create a client from `SWITCHBOT_TOKEN` and `SWITCHBOT_SECRET`
    pub fn from_env() -> RestResult<Self> {
        let credentials = Credentials::from_env()?;
        Self::with_config(ClientConfig::new().with_credentials(credentials))
    }

    /// Create a client with custom configuration and the JSON codec
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec> SwitchBotClient<C> {
    /// Create a client with custom configuration and codec
    ///
    /// # Errors
    /// Fails if credentials are missing, the base URL is not an absolute
    /// http(s) URL, the timeout is zero, or the default HTTP client cannot be
    /// built.
    pub fn with_codec(config: ClientConfig, codec: C) -> RestResult<Self> {
        let credentials = config
            .credentials
            .ok_or_else(|| RestError::InvalidConfig("credentials are required".to_string()))?;

        let base_url = parse_base_url(&config.base_url)?;

        if config.timeout_secs == 0 {
            return Err(RestError::InvalidConfig(
                "timeout must be at least one second".to_string(),
            ));
        }

        let transport: Arc<dyn Transport> = match config.transport {
            Some(transport) => transport,
            None => {
                let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
                let transport =
                    ReqwestTransport::new(Duration::from_secs(config.timeout_secs), user_agent)
                        .map_err(|e| {
                            RestError::InvalidConfig(format!("failed to create HTTP client: {}", e))
                        })?;
                Arc::new(transport)
            }
        };

        info!(base_url = %base_url, "Created SwitchBot REST client");

        Ok(Self {
            inner: Arc::new(Inner {
                credentials,
                base_url,
                transport,
                codec,
            }),
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Codec used for request and response bodies
    pub fn codec(&self) -> &C {
        &self.inner.codec
    }

    // ========================================================================
    // Request Pipeline
    // ========================================================================

    /// Send a signed request and classify the response
    ///
    /// `path` is resolved against the base URL. Dropping the returned future
    /// aborts the in-flight call.
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> RestResult<Envelope>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request = self.prepare(method, path, body)?;
        let response = self.inner.transport.send(request).await?;
        self.interpret(response)
    }

    /// Like [`execute`](Self::execute), failing with
    /// [`TransportError::Timeout`] if no response arrives within `deadline`
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn execute_with_timeout<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        deadline: Duration,
    ) -> RestResult<Envelope>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request = self.prepare(method, path, body)?;
        let response = tokio::time::timeout(deadline, self.inner.transport.send(request))
            .await
            .map_err(|_| {
                debug!(?deadline, "Request deadline elapsed");
                TransportError::Timeout(deadline)
            })??;
        self.interpret(response)
    }

    /// Like [`execute`](Self::execute), failing with
    /// [`TransportError::Cancelled`] as soon as `cancel` fires
    #[instrument(skip(self, method, body, cancel), fields(method = %method))]
    pub async fn execute_with_cancel<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> RestResult<Envelope>
    where
        B: Serialize + ?Sized + Sync,
    {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        let request = self.prepare(method, path, body)?;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Request cancelled by caller");
                return Err(TransportError::Cancelled.into());
            }
            result = self.inner.transport.send(request) => result?,
        };
        self.interpret(response)
    }

    /// Resolve, encode and sign
    fn prepare<B>(&self, method: Method, path: &str, body: Option<&B>) -> RestResult<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|source| RestError::InvalidPath {
                path: path.to_string(),
                source,
            })?;

        let body = body
            .map(|b| self.inner.codec.encode(b))
            .transpose()
            .map_err(RestError::Encode)?;

        let mut headers = HeaderMap::new();
        attach_headers(&mut headers, &self.inner.credentials)?;

        debug!(%url, has_body = body.is_some(), "Dispatching signed request");

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Decode the envelope and classify it
    fn interpret(&self, response: HttpResponse) -> RestResult<Envelope> {
        let HttpResponse { status, body, .. } = response;

        let envelope: Envelope = match self.inner.codec.decode(&body) {
            Ok(envelope) => envelope,
            Err(err) if status >= 400 => {
                let message = format!("Received HTTP {} error with unparsable body", status);
                return Err(ApiError::new(i32::from(status), message, body)
                    .with_cause(ApiErrorCause::Decode(err))
                    .into());
            }
            Err(source) => {
                return Err(RestError::Protocol {
                    status,
                    source,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
        };

        debug!(
            status,
            status_code = envelope.status_code,
            "Decoded response envelope"
        );

        Ok(classify(envelope, status)?)
    }

    pub(crate) async fn get(&self, path: &str) -> RestResult<Envelope> {
        self.execute::<()>(Method::GET, path, None).await
    }

    pub(crate) async fn post<B>(&self, path: &str, body: Option<&B>) -> RestResult<Envelope>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.execute(Method::POST, path, body).await
    }

    // ========================================================================
    // Resource Endpoints
    // ========================================================================

    /// Device endpoints
    pub fn devices(&self) -> DeviceEndpoints<'_, C> {
        DeviceEndpoints::new(self)
    }

    /// Scene endpoints
    pub fn scenes(&self) -> SceneEndpoints<'_, C> {
        SceneEndpoints::new(self)
    }

    /// Webhook endpoints
    pub fn webhooks(&self) -> WebhookEndpoints<'_, C> {
        WebhookEndpoints::new(self)
    }

    /// List physical devices and virtual IR remotes
    pub async fn get_devices(&self) -> RestResult<DeviceList> {
        self.devices().list().await
    }

    /// Get the status of a physical device
    pub async fn get_device_status(&self, device_id: &str) -> RestResult<DeviceStatus> {
        self.devices().status(device_id).await
    }

    /// Send a command to a device
    pub async fn send_device_command(
        &self,
        device_id: &str,
        command: &DeviceCommand,
    ) -> RestResult<CommandResponse> {
        self.devices().command(device_id, command).await
    }

    /// List manual scenes
    pub async fn get_scenes(&self) -> RestResult<Vec<Scene>> {
        self.scenes().list().await
    }

    /// Run a manual scene
    pub async fn execute_scene(&self, scene_id: &str) -> RestResult<()> {
        self.scenes().execute(scene_id).await
    }

    /// Register a webhook URL
    pub async fn setup_webhook(&self, url: &str) -> RestResult<()> {
        self.webhooks().setup(url).await
    }

    /// List configured webhook URLs
    pub async fn query_webhook_urls(&self) -> RestResult<Vec<String>> {
        self.webhooks().query_urls().await
    }

    /// Get details of configured webhook URLs
    pub async fn query_webhook_details(&self, urls: &[&str]) -> RestResult<Vec<WebhookDetails>> {
        self.webhooks().query_details(urls).await
    }

    /// Enable or disable a webhook URL
    pub async fn update_webhook(&self, url: &str, enable: bool) -> RestResult<()> {
        self.webhooks().update(url, enable).await
    }

    /// Remove a webhook URL
    pub async fn delete_webhook(&self, url: &str) -> RestResult<()> {
        self.webhooks().delete(url).await
    }
}

impl<C> Clone for SwitchBotClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> std::fmt::Debug for SwitchBotClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchBotClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}

/// Build the path for an API resource, e.g. `api_path("devices")` is
/// `/v1.1/devices`
pub(crate) fn api_path(resource: &str) -> String {
    format!("/{}/{}", API_VERSION, resource)
}

fn parse_base_url(raw: &str) -> RestResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| RestError::InvalidConfig(format!("invalid base URL {:?}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(RestError::InvalidConfig(format!(
            "invalid base URL {:?}: expected an absolute http(s) URL",
            raw
        )));
    }

    Ok(url)
}

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// API credentials (required)
    pub credentials: Option<Credentials>,
    /// Base URL (defaults to the production API)
    pub base_url: String,
    /// Request timeout in seconds for the default transport
    pub timeout_secs: u64,
    /// Custom user agent for the default transport
    pub user_agent: Option<String>,
    /// Transport override
    pub transport: Option<Arc<dyn Transport>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            transport: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set base URL (validated when the client is built)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a custom transport instead of the default `reqwest` one
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}
