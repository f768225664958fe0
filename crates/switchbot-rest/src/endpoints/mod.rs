//! API endpoint implementations

pub mod devices;
pub mod scenes;
pub mod webhook;

pub use devices::DeviceEndpoints;
pub use scenes::SceneEndpoints;
pub use webhook::WebhookEndpoints;

use crate::error::{RestError, RestResult};

fn require_non_empty(value: &str, name: &str) -> RestResult<()> {
    if value.is_empty() {
        return Err(RestError::InvalidParameter(format!("{} cannot be empty", name)));
    }
    Ok(())
}
