use std::{collections::BTreeMap, sync::Arc, time::Duration};

use common::{Light, LightId, LightPosition, Room, Scene, SceneId, TransitionTime, Xy};
use log::info;

use super::{
    scheduler::{LoopRequest, SceneScheduler},
    LightAssignment,
};
use crate::{
    bridge::LightBridge,
    colour::{self, Gamut, GAMUT_C},
    error::{SceneError, SceneResult},
    store::SceneStore,
};

/// Fade time for a scene applied once without a `transitionTime`.
pub const DEFAULT_TRANSITION: TransitionTime = 50;

/// How a scene should be shown when it is activated.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivationRequest {
    /// 1-based colour position each light starts on.
    pub positions: Vec<LightPosition>,
    pub looping: bool,
    /// Seconds. The loop period, and the fade time of every push.
    pub transition_secs: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomOverview {
    pub room: Room,
    pub scenes: Vec<Scene>,
    /// The stored scene the room is currently looping.
    pub looping: Option<SceneId>,
    /// Also true for a loop started straight on the scheduler with no
    /// stored scene behind it, where `looping` is `None`.
    pub loop_active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColourSwatch {
    pub id: i64,
    pub hex: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneDetail {
    pub scene: Scene,
    pub colours: Vec<ColourSwatch>,
    pub lights: Vec<Light>,
    /// Saved 1-based start positions, by light.
    pub positions: BTreeMap<LightId, usize>,
    pub looping: bool,
}

/// Ties the scene store, the bridge and the scheduler together. Request
/// handlers only talk to this.
pub struct SceneManager {
    store: Arc<dyn SceneStore>,
    bridge: Arc<dyn LightBridge>,
    scheduler: Arc<SceneScheduler>,
    gamut: Gamut,
}

impl SceneManager {
    pub fn new(
        store: Arc<dyn SceneStore>,
        bridge: Arc<dyn LightBridge>,
        scheduler: Arc<SceneScheduler>,
    ) -> Self {
        Self {
            store,
            bridge,
            scheduler,
            gamut: GAMUT_C,
        }
    }

    pub fn scheduler(&self) -> &SceneScheduler {
        &self.scheduler
    }

    pub async fn rooms(&self) -> SceneResult<Vec<Room>> {
        Ok(self.bridge.list_groups().await?.into_values().collect())
    }

    pub async fn room(&self, room_id: &str) -> SceneResult<Room> {
        self.bridge
            .list_groups()
            .await?
            .remove(room_id)
            .ok_or_else(|| SceneError::not_found(format!("room {}", room_id)))
    }

    pub async fn room_overview(&self, room_id: &str) -> SceneResult<RoomOverview> {
        let room = self.room(room_id).await?;
        let scenes = self.store.list_scenes(room_id).await?;

        Ok(RoomOverview {
            room,
            scenes,
            looping: self.scheduler.active_scene(room_id).await,
            loop_active: self.scheduler.is_active(room_id).await,
        })
    }

    pub async fn room_lights(&self, room_id: &str) -> SceneResult<Vec<Light>> {
        self.bridge.room_lights(room_id).await
    }

    /// Stores a new scene from hex colours, in the order given.
    pub async fn create_scene(
        &self,
        room_id: &str,
        name: &str,
        hex_colours: &[String],
    ) -> SceneResult<SceneId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SceneError::invalid("a scene needs a name"));
        }
        if hex_colours.is_empty() {
            return Err(SceneError::invalid("a scene needs at least one colour"));
        }

        let colours = hex_colours
            .iter()
            .map(|hex| colour::hex_to_xy(hex, &self.gamut))
            .collect::<SceneResult<Vec<Xy>>>()?;

        let scene_id = self.store.create_scene(room_id, name, &colours).await?;
        info!(
            "Room {}: created scene {} '{}' with {} colours",
            room_id,
            scene_id,
            name,
            colours.len()
        );

        Ok(scene_id)
    }

    /// Looks a scene up and checks it belongs to the room.
    pub async fn scene(&self, room_id: &str, scene_id: SceneId) -> SceneResult<Scene> {
        let scene = self.store.get_scene(scene_id).await?;
        if scene.room_id != room_id {
            return Err(SceneError::not_found(format!(
                "scene {} in room {}",
                scene_id, room_id
            )));
        }
        Ok(scene)
    }

    pub async fn scene_detail(&self, room_id: &str, scene_id: SceneId) -> SceneResult<SceneDetail> {
        let scene = self.scene(room_id, scene_id).await?;
        let lights = self.bridge.room_lights(room_id).await?;

        let colours = self
            .store
            .scene_colours(scene_id)
            .await?
            .into_iter()
            .map(|colour| ColourSwatch {
                id: colour.id,
                hex: colour::xy_to_hex(colour.xy, &self.gamut),
            })
            .collect();

        let positions = self
            .store
            .light_positions(scene_id)
            .await?
            .into_iter()
            .map(|p| (p.light_id, p.position))
            .collect();

        Ok(SceneDetail {
            scene,
            colours,
            lights,
            positions,
            looping: self.scheduler.active_scene(room_id).await == Some(scene_id),
        })
    }

    /// Shows a scene on the room's lights, either once or cycling.
    pub async fn activate(
        &self,
        room_id: &str,
        scene_id: SceneId,
        request: ActivationRequest,
    ) -> SceneResult<()> {
        self.scene(room_id, scene_id).await?;

        let colours: Vec<Xy> = self
            .store
            .scene_colours(scene_id)
            .await?
            .into_iter()
            .map(|colour| colour.xy)
            .collect();

        let assignment = request
            .positions
            .iter()
            .map(|p| {
                if p.position == 0 {
                    Err(SceneError::invalid(format!(
                        "light {}: positions start at 1",
                        p.light_id
                    )))
                } else {
                    Ok((p.light_id.clone(), p.position - 1))
                }
            })
            .collect::<SceneResult<LightAssignment>>()?;
        assignment.validate(colours.len())?;

        let room_lights = self.bridge.room_lights(room_id).await?;
        if let Some(stranger) = request
            .positions
            .iter()
            .find(|p| !room_lights.iter().any(|light| light.id == p.light_id))
        {
            return Err(SceneError::invalid(format!(
                "light {} is not in room {}",
                stranger.light_id, room_id
            )));
        }

        let looping_period = match (request.looping, request.transition_secs) {
            (true, Some(seconds)) if seconds > 0 => Some(Duration::from_secs(seconds as u64)),
            (true, _) => {
                return Err(SceneError::invalid(
                    "looping needs a transition time of at least 1 second",
                ))
            }
            (false, _) => None,
        };

        // Nothing has reached the lights yet, so a failed save leaves no trace
        self.store
            .save_light_positions(scene_id, &request.positions)
            .await?;

        match looping_period {
            Some(period) => {
                self.scheduler
                    .activate(LoopRequest {
                        room_id: room_id.to_string(),
                        scene_id: Some(scene_id),
                        colours,
                        assignment,
                        period,
                    })
                    .await?;
            }
            None => {
                let transition = request
                    .transition_secs
                    .map(|s| super::scheduler::transition_for(Duration::from_secs(s as u64)))
                    .unwrap_or(DEFAULT_TRANSITION);

                self.scheduler
                    .apply(room_id, &colours, &assignment, transition)
                    .await?;
            }
        }

        Ok(())
    }

    /// Stops the room's loop, if it has one.
    pub async fn stop(&self, room_id: &str) -> bool {
        self.scheduler.cancel(room_id).await
    }

    /// Deletes a scene, stopping it first if the room is looping it.
    pub async fn delete_scene(&self, room_id: &str, scene_id: SceneId) -> SceneResult<()> {
        self.scene(room_id, scene_id).await?;
        self.scheduler.cancel_scene(room_id, scene_id).await;
        self.store.delete_scene(scene_id).await?;

        info!("Room {}: deleted scene {}", room_id, scene_id);
        Ok(())
    }
}
