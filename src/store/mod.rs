use async_trait::async_trait;
use common::{LightPosition, Scene, SceneColour, SceneId, Xy};

use crate::error::SceneResult;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Persistence for scenes, their colours and their saved light positions.
#[async_trait]
pub trait SceneStore: Send + Sync {
    /// Creates the tables if they are missing.
    async fn init_schema(&self) -> SceneResult<()>;

    /// Inserts the scene and its colours as one unit; colour order is kept.
    async fn create_scene(&self, room_id: &str, name: &str, colours: &[Xy]) -> SceneResult<SceneId>;

    async fn list_scenes(&self, room_id: &str) -> SceneResult<Vec<Scene>>;

    /// Fails with `NotFound` for an unknown id.
    async fn get_scene(&self, scene_id: SceneId) -> SceneResult<Scene>;

    /// The scene's colours in cycling order. Empty for an unknown id.
    async fn scene_colours(&self, scene_id: SceneId) -> SceneResult<Vec<SceneColour>>;

    /// Removes the scene with its colours and light positions.
    async fn delete_scene(&self, scene_id: SceneId) -> SceneResult<()>;

    /// Replaces the saved start positions of a scene.
    async fn save_light_positions(
        &self,
        scene_id: SceneId,
        positions: &[LightPosition],
    ) -> SceneResult<()>;

    async fn light_positions(&self, scene_id: SceneId) -> SceneResult<Vec<LightPosition>>;
}
