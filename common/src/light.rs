use serde::{Deserialize, Serialize};

/// Bridge-assigned group id. Opaque; the bridge hands these out as strings.
pub type RoomId = String;
/// Bridge-assigned light id.
pub type LightId = String;

/// Bridge fade duration, in tenths of a second.
pub type TransitionTime = u16;

/// A CIE 1931 chromaticity coordinate, the bridge's native colour format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Xy {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Xy> for [f64; 2] {
    fn from(xy: Xy) -> Self {
        [xy.x, xy.y]
    }
}

/// A group of lights as the bridge reports it. Rooms are read-only to us.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub lights: Vec<LightId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    #[serde(default)]
    pub id: LightId,
    pub name: String,
    #[serde(default)]
    pub state: LightState,
}

/// Current state of a light. Only the fields we read are kept; the bridge
/// sends more.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    #[serde(default)]
    pub on: bool,
    /// Brightness
    #[serde(default)]
    pub bri: u8,
    #[serde(default)]
    pub xy: Option<Xy>,
    #[serde(default)]
    pub reachable: bool,
}

/// Body of a `PUT /lights/<id>/state` request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub xy: Xy,
    #[serde(rename = "transitiontime")]
    pub transition_time: TransitionTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_update_wire_format() {
        let update = StateUpdate {
            xy: Xy::new(0.692, 0.308),
            transition_time: 50,
        };

        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"xy":[0.692,0.308],"transitiontime":50}"#
        );
    }

    #[test]
    fn test_light_from_bridge_json() {
        let light: Light = serde_json::from_str(
            r#"{
                "name": "Desk",
                "type": "Extended color light",
                "state": {"on": true, "bri": 254, "xy": [0.3, 0.4], "ct": 366, "reachable": true}
            }"#,
        )
        .unwrap();

        assert_eq!(light.name, "Desk");
        assert_eq!(light.id, "");
        assert_eq!(light.state.xy, Some(Xy::new(0.3, 0.4)));
        assert!(light.state.reachable);
    }
}
