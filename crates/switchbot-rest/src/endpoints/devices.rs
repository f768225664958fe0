//! Device endpoints

use tracing::{debug, instrument};

use super::require_non_empty;
use crate::client::{api_path, SwitchBotClient};
use crate::codec::Codec;
use crate::error::RestResult;
use crate::types::{CommandResponse, DeviceCommand, DeviceList, DeviceStatus};

/// Device listing, status and control
pub struct DeviceEndpoints<'a, C> {
    client: &'a SwitchBotClient<C>,
}

impl<'a, C: Codec> DeviceEndpoints<'a, C> {
    pub fn new(client: &'a SwitchBotClient<C>) -> Self {
        Self { client }
    }

    /// List physical devices and virtual IR remotes
    #[instrument(skip(self))]
    pub async fn list(&self) -> RestResult<DeviceList> {
        let envelope = self.client.get(&api_path("devices")).await?;
        let list: DeviceList = if envelope.has_null_body() {
            DeviceList::default()
        } else {
            envelope.decode_body("device list")?
        };

        debug!(
            devices = list.device_list.len(),
            remotes = list.infrared_remote_list.len(),
            "Fetched device list"
        );
        Ok(list)
    }

    /// Get the status of a physical device
    ///
    /// An empty body yields an empty status.
    #[instrument(skip(self))]
    pub async fn status(&self, device_id: &str) -> RestResult<DeviceStatus> {
        require_non_empty(device_id, "device ID")?;

        let path = api_path(&format!("devices/{}/status", device_id));
        let envelope = self.client.get(&path).await?;

        if envelope.has_empty_body() {
            return Ok(DeviceStatus::default());
        }
        envelope.decode_body("device status")
    }

    /// Send a command to a device
    ///
    /// An empty body yields an empty response map.
    #[instrument(skip(self, command), fields(command = %command.command))]
    pub async fn command(
        &self,
        device_id: &str,
        command: &DeviceCommand,
    ) -> RestResult<CommandResponse> {
        require_non_empty(device_id, "device ID")?;
        require_non_empty(&command.command, "command")?;

        let path = api_path(&format!("devices/{}/commands", device_id));
        let envelope = self.client.post(&path, Some(command)).await?;

        if envelope.has_empty_body() {
            return Ok(CommandResponse::new());
        }
        envelope.decode_body("command response")
    }
}
