use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use common::{Light, LightId, LightState, Room, RoomId, TransitionTime, Xy};
use tokio::time::Instant;

use super::LightBridge;
use crate::error::{SceneError, SceneResult};

/// One `set_light_state` call as seen by a [`MemoryBridge`].
#[derive(Clone, Debug, PartialEq)]
pub struct StateWrite {
    pub light_id: LightId,
    pub xy: Xy,
    pub transition: TransitionTime,
    pub at: Instant,
}

#[derive(Default)]
struct Inner {
    groups: BTreeMap<RoomId, Room>,
    lights: BTreeMap<LightId, Light>,
    writes: Vec<StateWrite>,
    failing: HashSet<LightId>,
}

/// An in-process bridge. Holds rooms and lights in memory and records every
/// state write, for tests and for running without hardware.
#[derive(Default)]
pub struct MemoryBridge {
    inner: Mutex<Inner>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room and a light for each of its ids, named after the id.
    pub fn with_room(self, room_id: &str, name: &str, light_ids: &[&str]) -> Self {
        {
            let mut inner = self.lock();
            inner.groups.insert(
                room_id.to_string(),
                Room {
                    id: room_id.to_string(),
                    name: name.to_string(),
                    lights: light_ids.iter().map(|id| id.to_string()).collect(),
                },
            );
            for id in light_ids {
                inner.lights.insert(
                    id.to_string(),
                    Light {
                        id: id.to_string(),
                        name: format!("Light {}", id),
                        state: LightState {
                            on: true,
                            bri: 254,
                            xy: None,
                            reachable: true,
                        },
                    },
                );
            }
        }
        self
    }

    /// Makes every write to `light_id` fail until cleared.
    pub fn fail_light(&self, light_id: &str) {
        self.lock().failing.insert(light_id.to_string());
    }

    pub fn writes(&self) -> Vec<StateWrite> {
        self.lock().writes.clone()
    }

    pub fn take_writes(&self) -> Vec<StateWrite> {
        std::mem::take(&mut self.lock().writes)
    }

    pub fn light_xy(&self, light_id: &str) -> Option<Xy> {
        self.lock().lights.get(light_id).and_then(|l| l.state.xy)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the recorded writes
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LightBridge for MemoryBridge {
    async fn list_groups(&self) -> SceneResult<BTreeMap<RoomId, Room>> {
        Ok(self.lock().groups.clone())
    }

    async fn list_lights(&self) -> SceneResult<BTreeMap<LightId, Light>> {
        Ok(self.lock().lights.clone())
    }

    async fn set_light_state(
        &self,
        light_id: &str,
        xy: Xy,
        transition: TransitionTime,
    ) -> SceneResult<()> {
        let mut inner = self.lock();

        if inner.failing.contains(light_id) {
            return Err(SceneError::upstream(format!("light {} unreachable", light_id)));
        }

        if let Some(light) = inner.lights.get_mut(light_id) {
            light.state.xy = Some(xy);
        }
        inner.writes.push(StateWrite {
            light_id: light_id.to_string(),
            xy,
            transition,
            at: Instant::now(),
        });

        Ok(())
    }
}
