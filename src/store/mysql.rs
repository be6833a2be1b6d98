use async_trait::async_trait;
use common::{LightPosition, Scene, SceneColour, SceneId, Xy};
use log::info;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions},
    Row,
};

use super::SceneStore;
use crate::{
    config::DatabaseConfig,
    error::{SceneError, SceneResult},
};

const SCENES_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS `scenes` (
    `id` int NOT NULL AUTO_INCREMENT,
    `name` nvarchar(255) NOT NULL,
    `room_id` varchar(64) NOT NULL,
    PRIMARY KEY (`id`),
    KEY `room_id` (`room_id`)
) ENGINE=InnoDB";

const SCENE_LIGHTS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS `scene_lights` (
    `id` int NOT NULL AUTO_INCREMENT,
    `scene_id` int NOT NULL,
    `light_id` varchar(64) NOT NULL,
    `position` int NOT NULL,
    PRIMARY KEY (`id`),
    KEY `scene_id` (`scene_id`)
) ENGINE=InnoDB";

const SCENE_COLOURS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS `scene_colours` (
    `id` int NOT NULL AUTO_INCREMENT,
    `scene_id` int NOT NULL,
    `x` double NOT NULL,
    `y` double NOT NULL,
    PRIMARY KEY (`id`),
    KEY `scene_id` (`scene_id`)
) ENGINE=InnoDB";

/// Scene store backed by a MySQL database.
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub async fn connect(config: &DatabaseConfig) -> SceneResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Connected to database {} on {}", config.name, config.host);

        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SceneStore for MySqlStore {
    async fn init_schema(&self) -> SceneResult<()> {
        for sql in [SCENES_TABLE_SQL, SCENE_LIGHTS_TABLE_SQL, SCENE_COLOURS_TABLE_SQL] {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn create_scene(&self, room_id: &str, name: &str, colours: &[Xy]) -> SceneResult<SceneId> {
        let mut tx = self.pool.begin().await?;

        let scene_id = sqlx::query("INSERT INTO `scenes` (name, room_id) VALUES (?, ?)")
            .bind(name)
            .bind(room_id)
            .execute(&mut *tx)
            .await?
            .last_insert_id() as SceneId;

        for xy in colours {
            sqlx::query("INSERT INTO `scene_colours` (scene_id, x, y) VALUES (?, ?, ?)")
                .bind(scene_id)
                .bind(xy.x)
                .bind(xy.y)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(scene_id)
    }

    async fn list_scenes(&self, room_id: &str) -> SceneResult<Vec<Scene>> {
        let rows = sqlx::query("SELECT id, name, room_id FROM scenes WHERE room_id = ? ORDER BY id")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(scene_from_row).collect()
    }

    async fn get_scene(&self, scene_id: SceneId) -> SceneResult<Scene> {
        let row = sqlx::query("SELECT id, name, room_id FROM scenes WHERE id = ?")
            .bind(scene_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| SceneError::not_found(format!("scene {}", scene_id)))?;

        scene_from_row(&row)
    }

    async fn scene_colours(&self, scene_id: SceneId) -> SceneResult<Vec<SceneColour>> {
        let rows = sqlx::query("SELECT id, scene_id, x, y FROM scene_colours WHERE scene_id = ? ORDER BY id")
            .bind(scene_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(SceneColour {
                    id: row.try_get::<i32, _>("id")? as i64,
                    scene_id: row.try_get::<i32, _>("scene_id")? as SceneId,
                    xy: Xy::new(row.try_get("x")?, row.try_get("y")?),
                })
            })
            .collect()
    }

    async fn delete_scene(&self, scene_id: SceneId) -> SceneResult<()> {
        let mut tx = self.pool.begin().await?;

        for sql in [
            "DELETE FROM scene_colours WHERE scene_id = ?",
            "DELETE FROM scene_lights WHERE scene_id = ?",
            "DELETE FROM scenes WHERE id = ?",
        ] {
            sqlx::query(sql).bind(scene_id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save_light_positions(
        &self,
        scene_id: SceneId,
        positions: &[LightPosition],
    ) -> SceneResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM scene_lights WHERE scene_id = ?")
            .bind(scene_id)
            .execute(&mut *tx)
            .await?;

        for position in positions {
            sqlx::query("INSERT INTO `scene_lights` (scene_id, light_id, position) VALUES (?, ?, ?)")
                .bind(scene_id)
                .bind(&position.light_id)
                .bind(position.position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn light_positions(&self, scene_id: SceneId) -> SceneResult<Vec<LightPosition>> {
        let rows = sqlx::query("SELECT light_id, position FROM scene_lights WHERE scene_id = ? ORDER BY id")
            .bind(scene_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(LightPosition {
                    light_id: row.try_get("light_id")?,
                    position: row.try_get::<i32, _>("position")?.max(1) as usize,
                })
            })
            .collect()
    }
}

fn scene_from_row(row: &sqlx::mysql::MySqlRow) -> SceneResult<Scene> {
    Ok(Scene {
        id: row.try_get::<i32, _>("id")? as SceneId,
        name: row.try_get("name")?,
        room_id: row.try_get("room_id")?,
    })
}

/// These run against a real server and are skipped unless `DATABASE_URL`
/// points at a MySQL database the tests may create tables in.
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn test_store() -> Option<MySqlStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping MySQL test");
            return None;
        };

        // One connection, so session state such as temporary tables is
        // seen by every query the store makes
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let store = MySqlStore::from_pool(pool);
        store.init_schema().await.unwrap();
        Some(store)
    }

    /// A room id no other test run uses.
    fn unique_room(tag: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{}-{}", tag, nanos % 1_000_000_000_000)
    }

    #[tokio::test]
    async fn test_create_keeps_colour_order_and_types() {
        let Some(store) = test_store().await else {
            return;
        };
        let room = unique_room("order");
        let colours = [Xy::new(0.692, 0.308), Xy::new(0.17, 0.7), Xy::new(0.3127, 0.329)];

        let scene_id = store.create_scene(&room, "Sunset", &colours).await.unwrap();

        let scene = store.get_scene(scene_id).await.unwrap();
        assert_eq!(
            scene,
            Scene {
                id: scene_id,
                name: "Sunset".to_string(),
                room_id: room.clone(),
            }
        );
        assert_eq!(store.list_scenes(&room).await.unwrap(), vec![scene]);

        let stored = store.scene_colours(scene_id).await.unwrap();
        let xys: Vec<Xy> = stored.iter().map(|c| c.xy).collect();
        assert_eq!(xys, colours);
        assert!(stored.iter().all(|c| c.scene_id == scene_id));
        assert!(stored.windows(2).all(|pair| pair[0].id < pair[1].id));

        let positions = vec![
            LightPosition {
                light_id: "10".to_string(),
                position: 3,
            },
            LightPosition {
                light_id: "11".to_string(),
                position: 1,
            },
        ];
        store.save_light_positions(scene_id, &positions).await.unwrap();
        store.save_light_positions(scene_id, &positions).await.unwrap();
        assert_eq!(store.light_positions(scene_id).await.unwrap(), positions);

        store.delete_scene(scene_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_colours_and_positions() {
        let Some(store) = test_store().await else {
            return;
        };
        let room = unique_room("delete");

        let scene_id = store
            .create_scene(&room, "Doomed", &[Xy::new(0.4, 0.4), Xy::new(0.2, 0.2)])
            .await
            .unwrap();
        store
            .save_light_positions(
                scene_id,
                &[LightPosition {
                    light_id: "10".to_string(),
                    position: 2,
                }],
            )
            .await
            .unwrap();

        store.delete_scene(scene_id).await.unwrap();

        assert!(store.scene_colours(scene_id).await.unwrap().is_empty());
        assert!(store.light_positions(scene_id).await.unwrap().is_empty());
        assert!(store.list_scenes(&room).await.unwrap().is_empty());
        assert!(matches!(
            store.get_scene(scene_id).await,
            Err(SceneError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_colour_insert_leaves_no_scene() {
        let Some(store) = test_store().await else {
            return;
        };
        let room = unique_room("rollback");

        // Shadow the colour table for this session with one that has no x/y
        sqlx::query("CREATE TEMPORARY TABLE `scene_colours` (`id` int NOT NULL AUTO_INCREMENT PRIMARY KEY, `scene_id` int NOT NULL)")
            .execute(&store.pool)
            .await
            .unwrap();

        let result = store
            .create_scene(&room, "Half done", &[Xy::new(0.4, 0.4)])
            .await;

        sqlx::query("DROP TEMPORARY TABLE `scene_colours`")
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(matches!(result, Err(SceneError::UpstreamUnavailable(_))));
        assert!(store.list_scenes(&room).await.unwrap().is_empty());
    }
}
