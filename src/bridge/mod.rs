use std::collections::BTreeMap;

use async_trait::async_trait;
use common::{Light, LightId, Room, RoomId, TransitionTime, Xy};

use crate::error::{SceneError, SceneResult};

pub mod hue;
pub mod memory;

pub use hue::HueBridge;
pub use memory::{MemoryBridge, StateWrite};

/// The part of the bridge's REST API this controller needs.
#[async_trait]
pub trait LightBridge: Send + Sync {
    /// Every group (room) the bridge knows, keyed by id.
    async fn list_groups(&self) -> SceneResult<BTreeMap<RoomId, Room>>;

    /// Every light the bridge knows, keyed by id.
    async fn list_lights(&self) -> SceneResult<BTreeMap<LightId, Light>>;

    async fn set_light_state(
        &self,
        light_id: &str,
        xy: Xy,
        transition: TransitionTime,
    ) -> SceneResult<()>;

    /// The lights of one room, in the order the bridge lists them.
    async fn room_lights(&self, room_id: &str) -> SceneResult<Vec<Light>> {
        let groups = self.list_groups().await?;
        let room = groups
            .get(room_id)
            .ok_or_else(|| SceneError::not_found(format!("room {}", room_id)))?;

        let mut lights = self.list_lights().await?;

        Ok(room
            .lights
            .iter()
            .filter_map(|light_id| lights.remove(light_id))
            .collect())
    }
}
