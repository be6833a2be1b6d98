use serde::{Deserialize, Serialize};

use crate::light::{LightId, RoomId, Xy};

pub type SceneId = i64;

/// A named colour sequence belonging to one room. Scenes are created and
/// deleted, never edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    pub room_id: RoomId,
}

/// One entry of a scene's colour sequence. Colours are ordered by `id`,
/// which is also the order they cycle in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneColour {
    pub id: i64,
    pub scene_id: SceneId,
    pub xy: Xy,
}

/// Saved 1-based start position of a light within a scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightPosition {
    pub light_id: LightId,
    pub position: usize,
}
