use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use common::{Light, LightId, Room, RoomId, StateUpdate, TransitionTime, Xy};
use log::debug;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::LightBridge;
use crate::{
    config::BridgeConfig,
    error::{SceneError, SceneResult},
};

/// Client for the bridge's local v1 REST API.
pub struct HueBridge {
    client: reqwest::Client,
    base_url: String,
}

impl HueBridge {
    pub fn new(config: &BridgeConfig) -> SceneResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("http://{}/api/{}", config.address, config.user),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `lights/{id}/state`, with the id kept to a single path segment.
    fn light_state_url(&self, light_id: &str) -> SceneResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SceneError::invalid(format!("bad bridge address: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SceneError::invalid("bad bridge address"))?
            .extend(["lights", light_id, "state"]);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> SceneResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SceneError::upstream(format!(
                "bridge answered {} for {}",
                response.status(),
                path
            )));
        }

        let body: Value = response.json().await?;
        check_bridge_errors(&body)?;

        serde_json::from_value(body)
            .map_err(|e| SceneError::upstream(format!("unexpected bridge response: {}", e)))
    }
}

/// The bridge answers API errors with a 200 and a body like
/// `[{"error": {"type": 1, "description": "unauthorized user"}}]`.
fn check_bridge_errors(body: &Value) -> SceneResult<()> {
    let Some(items) = body.as_array() else {
        return Ok(());
    };

    let errors: Vec<&str> = items
        .iter()
        .filter_map(|item| item.get("error"))
        .map(|error| {
            error
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SceneError::upstream(format!("bridge error: {}", errors.join(", "))))
    }
}

#[async_trait]
impl LightBridge for HueBridge {
    async fn list_groups(&self) -> SceneResult<BTreeMap<RoomId, Room>> {
        let mut groups: BTreeMap<RoomId, Room> = self.get("groups").await?;
        for (id, room) in groups.iter_mut() {
            room.id = id.clone();
        }
        Ok(groups)
    }

    async fn list_lights(&self) -> SceneResult<BTreeMap<LightId, Light>> {
        let mut lights: BTreeMap<LightId, Light> = self.get("lights").await?;
        for (id, light) in lights.iter_mut() {
            light.id = id.clone();
        }
        Ok(lights)
    }

    async fn set_light_state(
        &self,
        light_id: &str,
        xy: Xy,
        transition: TransitionTime,
    ) -> SceneResult<()> {
        let url = self.light_state_url(light_id)?;
        let update = StateUpdate {
            xy,
            transition_time: transition,
        };
        debug!("PUT {} {:?}", url, update);

        let response = self.client.put(url).json(&update).send().await?;
        if !response.status().is_success() {
            return Err(SceneError::upstream(format!(
                "bridge answered {} for light {}",
                response.status(),
                light_id
            )));
        }

        // A bad light id still comes back as 200 with an error entry
        let body: Value = response.json().await.unwrap_or(Value::Null);
        check_bridge_errors(&body)
    }
}
