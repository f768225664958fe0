//! Types for SwitchBot API requests and responses

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::error::{is_empty_body, RestError, RestResult};
use crate::status::SUCCESS;

// ============================================================================
// Response Envelope
// ============================================================================

/// Standard SwitchBot response wrapper
///
/// Missing fields decode to zero/empty so that bare error bodies such as
/// `{"message":"Unauthorized"}` still yield a usable message. The body is
/// kept as the exact bytes the server sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Application status code (`100` on success)
    #[serde(rename = "statusCode", default)]
    pub status_code: i32,
    /// Status message
    #[serde(default)]
    pub message: String,
    /// Resource payload, undecoded
    #[serde(default = "null_body")]
    pub body: Box<RawValue>,
}

fn null_body() -> Box<RawValue> {
    RawValue::NULL.to_owned()
}

impl Envelope {
    /// Check if the application status code is `100`
    pub fn is_success(&self) -> bool {
        self.status_code == SUCCESS
    }

    /// Check if the body is absent, `null`, or exactly `{}`
    pub fn has_empty_body(&self) -> bool {
        is_empty_body(self.body_bytes())
    }

    /// Check if the body is absent or `null`
    pub fn has_null_body(&self) -> bool {
        self.body.get() == "null"
    }

    /// Raw body bytes as received
    pub fn body_bytes(&self) -> &[u8] {
        self.body.get().as_bytes()
    }

    /// Deserialize the body into a resource type
    pub fn decode_body<T: DeserializeOwned>(&self, what: &str) -> RestResult<T> {
        serde_json::from_str(self.body.get()).map_err(|e| {
            RestError::Parse(format!(
                "failed to decode {} body: {}, body: {}",
                what,
                e,
                self.body.get()
            ))
        })
    }
}

impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.status_code == other.status_code
            && self.message == other.message
            && self.body.get() == other.body.get()
    }
}

// ============================================================================
// Device Types
// ============================================================================

/// Physical device from the device list
///
/// Fields shared by every device type are typed; per-type fields land in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device ID
    pub device_id: String,
    /// Name set in the app
    #[serde(default)]
    pub device_name: String,
    /// Device type (e.g. "Meter", "Bot", "Curtain")
    #[serde(default)]
    pub device_type: String,
    /// Whether cloud service is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cloud_service: Option<bool>,
    /// Parent hub ID ("000000000000" when none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_device_id: Option<String>,
    /// Device-type specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Virtual infrared remote from the device list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfraredRemote {
    /// Device ID
    pub device_id: String,
    /// Name set in the app
    #[serde(default)]
    pub device_name: String,
    /// Remote type (e.g. "TV", "Air Conditioner")
    #[serde(default)]
    pub remote_type: String,
    /// Hub that emits the IR signal
    #[serde(default)]
    pub hub_device_id: String,
}

/// Response body of `GET /v1.1/devices`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    /// Physical devices
    #[serde(default)]
    pub device_list: Vec<Device>,
    /// Virtual infrared remotes
    #[serde(default)]
    pub infrared_remote_list: Vec<InfraredRemote>,
}

/// Response body of `GET /v1.1/devices/{id}/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    /// Device ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Device type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Parent hub ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_device_id: Option<String>,
    /// Firmware version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Device-type specific fields (power, battery, temperature, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceStatus {
    /// Look up a device-type specific field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// `power` field, if the device reports one
    pub fn power(&self) -> Option<&str> {
        self.get("power").and_then(Value::as_str)
    }

    /// `battery` percentage, if the device reports one
    pub fn battery(&self) -> Option<u64> {
        self.get("battery").and_then(Value::as_u64)
    }
}

/// Kind of device command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    /// Standard command
    #[default]
    Command,
    /// Custom button on a virtual IR remote
    Customize,
}

/// Command parameter
///
/// Serialized as the literal string `"default"`, a string, or any JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CommandParameter {
    /// The literal `"default"`
    #[default]
    Default,
    /// Plain string parameter (e.g. `"26,1,3,on"` for `setAll`)
    Text(String),
    /// Structured parameter
    Json(Value),
}

const DEFAULT_PARAMETER: &str = "default";

impl Serialize for CommandParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Default => serializer.serialize_str(DEFAULT_PARAMETER),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Json(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CommandParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if s == DEFAULT_PARAMETER => Self::Default,
            Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        })
    }
}

/// Request body of `POST /v1.1/devices/{id}/commands`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommand {
    /// Command name (e.g. "turnOn")
    pub command: String,
    /// Command parameter
    #[serde(default)]
    pub parameter: CommandParameter,
    /// Command type
    #[serde(default)]
    pub command_type: CommandType,
}

impl DeviceCommand {
    /// Standard command with the default parameter
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            parameter: CommandParameter::Default,
            command_type: CommandType::Command,
        }
    }

    /// Custom IR button
    pub fn customize(button: impl Into<String>) -> Self {
        Self::new(button).with_command_type(CommandType::Customize)
    }

    /// Set the parameter
    pub fn with_parameter(mut self, parameter: CommandParameter) -> Self {
        self.parameter = parameter;
        self
    }

    /// Set the command type
    pub fn with_command_type(mut self, command_type: CommandType) -> Self {
        self.command_type = command_type;
        self
    }
}

/// Response body of a device command
///
/// Usually `{}`; asynchronous commands may return fields such as `commandId`.
pub type CommandResponse = Map<String, Value>;

// ============================================================================
// Scene Types
// ============================================================================

/// Manual scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Scene ID
    pub scene_id: String,
    /// Scene name
    #[serde(default)]
    pub scene_name: String,
}

// ============================================================================
// Webhook Types
// ============================================================================

/// Device filter for webhooks (the API only accepts "ALL")
pub const WEBHOOK_DEVICE_LIST_ALL: &str = "ALL";

/// Webhook request bodies, tagged by `action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum WebhookRequest {
    /// Register a webhook URL
    #[serde(rename = "setupWebhook")]
    Setup {
        /// Webhook URL
        url: String,
        /// Device filter
        #[serde(rename = "deviceList")]
        device_list: String,
    },
    /// List configured URLs
    #[serde(rename = "queryUrl")]
    QueryUrl,
    /// Get details of the given URLs
    #[serde(rename = "queryDetails")]
    QueryDetails {
        /// URLs to query
        urls: Vec<String>,
    },
    /// Enable or disable a URL
    #[serde(rename = "updateWebhook")]
    Update {
        /// New configuration
        config: WebhookConfig,
    },
    /// Remove a URL
    #[serde(rename = "deleteWebhook")]
    Delete {
        /// URL to remove
        url: String,
    },
}

/// Updatable webhook settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL
    pub url: String,
    /// Whether events are delivered
    pub enable: bool,
}

/// Response body of a `queryUrl` request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookUrls {
    /// Configured URLs
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Webhook configuration details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDetails {
    /// Webhook URL
    pub url: String,
    /// Device filter
    #[serde(default)]
    pub device_list: String,
    /// Creation time (Unix millis)
    #[serde(default)]
    pub create_time: i64,
    /// Last update time (Unix millis)
    #[serde(default)]
    pub last_update_time: i64,
    /// Whether events are delivered
    #[serde(default)]
    pub enable: bool,
}
