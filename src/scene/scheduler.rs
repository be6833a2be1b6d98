use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, Weak,
    },
    time::Duration,
};

use common::{RoomId, SceneId, TransitionTime, Xy};
use futures::future::join_all;
use log::{debug, info, warn};
use tokio::{task::JoinHandle, time::sleep};

use super::LightAssignment;
use crate::{
    bridge::LightBridge,
    error::{SceneError, SceneResult},
};

/// A scene to cycle through in one room.
#[derive(Clone, Debug)]
pub struct LoopRequest {
    pub room_id: RoomId,
    /// The stored scene the colours came from, if any.
    pub scene_id: Option<SceneId>,
    pub colours: Vec<Xy>,
    pub assignment: LightAssignment,
    /// Time between colour steps. Also used as the bridge fade time.
    pub period: Duration,
}

/// A running loop. Dropping it stops its task.
struct ActiveLoop {
    generation: u64,
    scene_id: Option<SceneId>,
    colours: Vec<Xy>,
    assignment: LightAssignment,
    transition: TransitionTime,
    task: JoinHandle<()>,
}

impl Drop for ActiveLoop {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Default)]
struct RoomSlot {
    active: Option<ActiveLoop>,
}

/// Everything that touches a room's loop (activation, cancellation and the
/// loop's own ticks) holds this lock, so they never interleave.
type SharedSlot = Arc<tokio::sync::Mutex<RoomSlot>>;

/// Owns at most one looping scene per room and drives it on its period.
///
/// Each active room has its own task which sleeps for the period, then
/// advances every light to its next colour and pushes the new colours to the
/// bridge. Activating a scene in a room replaces whatever loop that room had,
/// and a replaced loop never pushes again.
pub struct SceneScheduler {
    bridge: Arc<dyn LightBridge>,
    rooms: Mutex<HashMap<RoomId, SharedSlot>>,
    next_generation: AtomicU64,
}

impl SceneScheduler {
    pub fn new(bridge: Arc<dyn LightBridge>) -> Self {
        Self {
            bridge,
            rooms: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Starts cycling `request.colours` in the room, replacing any loop
    /// already running there. The initial colours are pushed once right
    /// away; the first step happens one period later.
    pub async fn activate(&self, request: LoopRequest) -> SceneResult<()> {
        request.assignment.validate(request.colours.len())?;
        if request.period.is_zero() {
            return Err(SceneError::invalid("loop period must be positive"));
        }

        let transition = transition_for(request.period);
        let slot = self.slot(&request.room_id);
        let mut room = slot.lock().await;

        if let Some(old) = room.active.take() {
            info!(
                "Room {}: replacing loop {} (scene {:?})",
                request.room_id, old.generation, old.scene_id
            );
        }

        push_colours(
            self.bridge.as_ref(),
            &request.room_id,
            &request.colours,
            &request.assignment,
            transition,
        )
        .await;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(run_loop(
            self.bridge.clone(),
            Arc::downgrade(&slot),
            request.room_id.clone(),
            generation,
            request.period,
        ));

        info!(
            "Room {}: looping scene {:?} over {} colours every {:?}",
            request.room_id,
            request.scene_id,
            request.colours.len(),
            request.period
        );

        room.active = Some(ActiveLoop {
            generation,
            scene_id: request.scene_id,
            colours: request.colours,
            assignment: request.assignment,
            transition,
            task,
        });

        Ok(())
    }

    /// Pushes colours once without looping. Any loop running in the room is
    /// stopped first so it cannot overwrite them.
    pub async fn apply(
        &self,
        room_id: &str,
        colours: &[Xy],
        assignment: &LightAssignment,
        transition: TransitionTime,
    ) -> SceneResult<()> {
        assignment.validate(colours.len())?;

        let slot = self.slot(room_id);
        let mut room = slot.lock().await;

        if let Some(old) = room.active.take() {
            info!("Room {}: loop {} stopped by a new scene", room_id, old.generation);
        }

        push_colours(self.bridge.as_ref(), room_id, colours, assignment, transition).await;

        Ok(())
    }

    /// Stops the room's loop. Returns false if there was none.
    pub async fn cancel(&self, room_id: &str) -> bool {
        let Some(slot) = self.existing_slot(room_id) else {
            return false;
        };

        let mut room = slot.lock().await;
        match room.active.take() {
            Some(old) => {
                info!("Room {}: loop {} cancelled", room_id, old.generation);
                true
            }
            None => false,
        }
    }

    /// Stops the room's loop only if it was started from `scene_id`.
    pub async fn cancel_scene(&self, room_id: &str, scene_id: SceneId) -> bool {
        let Some(slot) = self.existing_slot(room_id) else {
            return false;
        };

        let mut room = slot.lock().await;
        if room.active.as_ref().and_then(|a| a.scene_id) == Some(scene_id) {
            room.active = None;
            info!("Room {}: loop for scene {} cancelled", room_id, scene_id);
            true
        } else {
            false
        }
    }

    pub async fn is_active(&self, room_id: &str) -> bool {
        let Some(slot) = self.existing_slot(room_id) else {
            return false;
        };
        let room = slot.lock().await;
        room.active.is_some()
    }

    /// The scene the room is looping, if any.
    pub async fn active_scene(&self, room_id: &str) -> Option<SceneId> {
        let slot = self.existing_slot(room_id)?;
        let room = slot.lock().await;
        room.active.as_ref().and_then(|a| a.scene_id)
    }

    /// A snapshot of which colour each light of the room's loop is on.
    pub async fn assignment(&self, room_id: &str) -> Option<LightAssignment> {
        let slot = self.existing_slot(room_id)?;
        let room = slot.lock().await;
        room.active.as_ref().map(|a| a.assignment.clone())
    }

    pub async fn active_rooms(&self) -> Vec<RoomId> {
        let mut active = Vec::new();
        for (room_id, slot) in self.slots() {
            if slot.lock().await.active.is_some() {
                active.push(room_id);
            }
        }
        active.sort();
        active
    }

    /// Stops every loop.
    pub async fn shutdown(&self) {
        for (room_id, slot) in self.slots() {
            if slot.lock().await.active.take().is_some() {
                info!("Room {}: loop stopped for shutdown", room_id);
            }
        }
    }

    fn rooms(&self) -> std::sync::MutexGuard<'_, HashMap<RoomId, SharedSlot>> {
        self.rooms.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self, room_id: &str) -> SharedSlot {
        self.rooms()
            .entry(room_id.to_string())
            .or_default()
            .clone()
    }

    fn existing_slot(&self, room_id: &str) -> Option<SharedSlot> {
        self.rooms().get(room_id).cloned()
    }

    fn slots(&self) -> Vec<(RoomId, SharedSlot)> {
        self.rooms()
            .iter()
            .map(|(id, slot)| (id.clone(), slot.clone()))
            .collect()
    }
}

/// Bridge fade time matching a loop period, in tenths of a second.
pub fn transition_for(period: Duration) -> TransitionTime {
    (period.as_millis() / 100).min(TransitionTime::MAX as u128) as TransitionTime
}

async fn run_loop(
    bridge: Arc<dyn LightBridge>,
    slot: Weak<tokio::sync::Mutex<RoomSlot>>,
    room_id: RoomId,
    generation: u64,
    period: Duration,
) {
    loop {
        sleep(period).await;

        // The scheduler is gone
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let mut room = slot.lock().await;

        let Some(active) = room
            .active
            .as_mut()
            .filter(|active| active.generation == generation)
        else {
            debug!("Room {}: loop {} was replaced, exiting", room_id, generation);
            return;
        };

        active.assignment.advance(active.colours.len());
        debug!(
            "Room {}: loop {} step {:?}",
            room_id, generation, active.assignment
        );

        push_colours(
            bridge.as_ref(),
            &room_id,
            &active.colours,
            &active.assignment,
            active.transition,
        )
        .await;
    }
}

/// Sends each light its current colour. A light that fails is logged and
/// skipped; the others are still sent.
async fn push_colours(
    bridge: &dyn LightBridge,
    room_id: &str,
    colours: &[Xy],
    assignment: &LightAssignment,
    transition: TransitionTime,
) {
    let pushes = assignment.colours(colours).map(|(light_id, xy)| async move {
        let result = bridge.set_light_state(light_id, xy, transition).await;
        (light_id, result)
    });

    for (light_id, result) in join_all(pushes).await {
        if let Err(e) = result {
            warn!("Room {}: light {} not updated: {}", room_id, light_id, e);
        }
    }
}
