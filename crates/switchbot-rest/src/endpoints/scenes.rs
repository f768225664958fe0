//! Scene endpoints

use tracing::instrument;

use super::require_non_empty;
use crate::client::{api_path, SwitchBotClient};
use crate::codec::Codec;
use crate::error::RestResult;
use crate::types::Scene;

/// Manual scene listing and execution
pub struct SceneEndpoints<'a, C> {
    client: &'a SwitchBotClient<C>,
}

impl<'a, C: Codec> SceneEndpoints<'a, C> {
    pub fn new(client: &'a SwitchBotClient<C>) -> Self {
        Self { client }
    }

    /// List manual scenes
    #[instrument(skip(self))]
    pub async fn list(&self) -> RestResult<Vec<Scene>> {
        let envelope = self.client.get(&api_path("scenes")).await?;
        if envelope.has_null_body() {
            return Ok(Vec::new());
        }
        envelope.decode_body("scene list")
    }

    /// Run a manual scene
    #[instrument(skip(self))]
    pub async fn execute(&self, scene_id: &str) -> RestResult<()> {
        require_non_empty(scene_id, "scene ID")?;

        let path = api_path(&format!("scenes/{}/execute", scene_id));
        self.client.post::<()>(&path, None).await?;
        Ok(())
    }
}
