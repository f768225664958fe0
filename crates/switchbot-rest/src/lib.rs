//! REST API client for the SwitchBot smart-home control API
//!
//! This crate provides a typed client for the SwitchBot v1.1 API,
//! covering devices, scenes and webhooks on top of a single signed request
//! pipeline.
//!
//! # Features
//!
//! - **Devices**: list, status, commands
//! - **Scenes**: list, execute
//! - **Webhooks**: setup, query, update, delete
//! - **Pluggable**: swap the HTTP [`Transport`] or the body [`Codec`]
//!
//! # Authentication
//!
//! Every request is signed with HMAC-SHA256 over the token, a millisecond
//! timestamp and a fresh time-ordered nonce (see `switchbot-auth`).
//!
//! # Errors
//!
//! A response can fail on two levels. HTTP statuses >= 400 and the known
//! device error codes in the envelope (151, 152, 160, 161, 171, 190) become
//! [`RestError::Api`]. Network failures, timeouts and cancellation become
//! [`RestError::Transport`]. Other envelope codes are returned as data.
//!
//! # Example
//!
//! ```no_run
//! use switchbot_rest::{DeviceCommand, SwitchBotClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SwitchBotClient::from_env()?;
//!
//!     let devices = client.get_devices().await?;
//!     if let Some(bot) = devices.device_list.iter().find(|d| d.device_type == "Bot") {
//!         client
//!             .send_device_command(&bot.device_id, &DeviceCommand::new("press"))
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod client;
pub mod codec;
pub mod endpoints;
pub mod error;
pub mod status;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::{ClientConfig, SwitchBotClient, API_VERSION, DEFAULT_BASE_URL};
pub use codec::{Codec, CodecError, JsonCodec};
pub use error::{is_empty_body, ApiError, ApiErrorCause, RestError, RestResult};
pub use status::StatusCode;
pub use switchbot_auth::{AuthError, Credentials};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

// Re-export endpoint-specific types
pub use types::{
    CommandParameter, CommandResponse, CommandType, Device, DeviceCommand, DeviceList,
    DeviceStatus, Envelope, InfraredRemote, Scene, WebhookConfig, WebhookDetails, WebhookRequest,
};

// Types that appear in the client's signatures
pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;
