use std::sync::Mutex;

use async_trait::async_trait;
use common::{LightPosition, Scene, SceneColour, SceneId, Xy};

use super::SceneStore;
use crate::error::{SceneError, SceneResult};

#[derive(Default)]
struct Tables {
    scenes: Vec<Scene>,
    colours: Vec<SceneColour>,
    lights: Vec<(SceneId, LightPosition)>,
    next_scene_id: SceneId,
    next_colour_id: i64,
}

/// Scene store kept in process memory. Ids count up from 1 like the
/// database's auto-increment keys.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SceneStore for MemoryStore {
    async fn init_schema(&self) -> SceneResult<()> {
        Ok(())
    }

    async fn create_scene(&self, room_id: &str, name: &str, colours: &[Xy]) -> SceneResult<SceneId> {
        let mut tables = self.lock();

        tables.next_scene_id += 1;
        let scene_id = tables.next_scene_id;
        tables.scenes.push(Scene {
            id: scene_id,
            name: name.to_string(),
            room_id: room_id.to_string(),
        });

        for xy in colours {
            tables.next_colour_id += 1;
            let id = tables.next_colour_id;
            tables.colours.push(SceneColour {
                id,
                scene_id,
                xy: *xy,
            });
        }

        Ok(scene_id)
    }

    async fn list_scenes(&self, room_id: &str) -> SceneResult<Vec<Scene>> {
        Ok(self
            .lock()
            .scenes
            .iter()
            .filter(|scene| scene.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn get_scene(&self, scene_id: SceneId) -> SceneResult<Scene> {
        self.lock()
            .scenes
            .iter()
            .find(|scene| scene.id == scene_id)
            .cloned()
            .ok_or_else(|| SceneError::not_found(format!("scene {}", scene_id)))
    }

    async fn scene_colours(&self, scene_id: SceneId) -> SceneResult<Vec<SceneColour>> {
        Ok(self
            .lock()
            .colours
            .iter()
            .filter(|colour| colour.scene_id == scene_id)
            .copied()
            .collect())
    }

    async fn delete_scene(&self, scene_id: SceneId) -> SceneResult<()> {
        let mut tables = self.lock();
        tables.scenes.retain(|scene| scene.id != scene_id);
        tables.colours.retain(|colour| colour.scene_id != scene_id);
        tables.lights.retain(|(id, _)| *id != scene_id);
        Ok(())
    }

    async fn save_light_positions(
        &self,
        scene_id: SceneId,
        positions: &[LightPosition],
    ) -> SceneResult<()> {
        let mut tables = self.lock();
        tables.lights.retain(|(id, _)| *id != scene_id);
        tables
            .lights
            .extend(positions.iter().map(|p| (scene_id, p.clone())));
        Ok(())
    }

    async fn light_positions(&self, scene_id: SceneId) -> SceneResult<Vec<LightPosition>> {
        Ok(self
            .lock()
            .lights
            .iter()
            .filter(|(id, _)| *id == scene_id)
            .map(|(_, p)| p.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let store = MemoryStore::new();
        let first = store.create_scene("1", "Sunset", &[Xy::new(0.6, 0.3)]).await.unwrap();
        let second = store.create_scene("2", "Ocean", &[]).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let scenes = store.list_scenes("1").await.unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].name, "Sunset");
        assert_eq!(store.get_scene(2).await.unwrap().room_id, "2");
    }

    #[tokio::test]
    async fn test_colours_keep_insertion_order() {
        let store = MemoryStore::new();
        let colours = [Xy::new(0.1, 0.1), Xy::new(0.5, 0.4), Xy::new(0.2, 0.6)];
        let id = store.create_scene("1", "Three", &colours).await.unwrap();

        let stored: Vec<Xy> = store
            .scene_colours(id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.xy)
            .collect();
        assert_eq!(stored, colours);
    }

    #[tokio::test]
    async fn test_delete_removes_colours_and_positions() {
        let store = MemoryStore::new();
        let id = store
            .create_scene("1", "Party", &[Xy::new(0.6, 0.3), Xy::new(0.2, 0.6)])
            .await
            .unwrap();
        store
            .save_light_positions(
                id,
                &[LightPosition {
                    light_id: "10".to_string(),
                    position: 2,
                }],
            )
            .await
            .unwrap();

        store.delete_scene(id).await.unwrap();

        assert!(store.scene_colours(id).await.unwrap().is_empty());
        assert!(store.light_positions(id).await.unwrap().is_empty());
        assert!(matches!(store.get_scene(id).await, Err(SceneError::NotFound(_))));
    }
}
