//! Parsing of the urlencoded forms posted by the scene pages. Fields are
//! taken as ordered pairs since colour order matters.

use common::LightPosition;
use hue_scenes::{error::SceneError, error::SceneResult, scene::prelude::ActivationRequest};

const COLOUR_PREFIX: &str = "hexColour-";
const LIGHT_PREFIX: &str = "light-";

#[derive(Debug, PartialEq)]
pub struct CreateSceneForm {
    pub name: String,
    /// Hex colours in submission order
    pub colours: Vec<String>,
}

impl CreateSceneForm {
    pub fn parse(fields: &[(String, String)]) -> SceneResult<Self> {
        let name = field(fields, "name")
            .ok_or_else(|| SceneError::invalid("missing field 'name'"))?
            .to_string();

        let colours = fields
            .iter()
            .filter(|(key, _)| key.starts_with(COLOUR_PREFIX))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { name, colours })
    }
}

/// Reads `light-<id>` positions, `loop` and `transitionTime`.
pub fn parse_activation(fields: &[(String, String)]) -> SceneResult<ActivationRequest> {
    let positions = fields
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(LIGHT_PREFIX)
                .map(|light_id| (light_id, value.trim()))
        })
        .map(|(light_id, value)| {
            if light_id.is_empty() {
                return Err(SceneError::invalid("light field without an id"));
            }
            // Bridge light ids are plain numbers
            if !light_id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(SceneError::invalid(format!("'{}' is not a light id", light_id)));
            }
            let position = value.parse().map_err(|_| {
                SceneError::invalid(format!("light {}: '{}' is not a position", light_id, value))
            })?;
            Ok(LightPosition {
                light_id: light_id.to_string(),
                position,
            })
        })
        .collect::<SceneResult<Vec<_>>>()?;

    let looping = field(fields, "loop") == Some("true");

    let transition_secs = match field(fields, "transitionTime").map(str::trim) {
        Some("") | None => None,
        Some(value) => Some(value.parse().map_err(|_| {
            SceneError::invalid(format!("'{}' is not a number of seconds", value))
        })?),
    };

    Ok(ActivationRequest {
        positions,
        looping,
        transition_secs,
    })
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_create_form_keeps_colour_order() {
        let form = CreateSceneForm::parse(&fields(&[
            ("name", "Sunset"),
            ("hexColour-2", "#00FF00"),
            ("hexColour-1", "#FF0000"),
            ("hexColour-3", ""),
        ]))
        .unwrap();

        assert_eq!(
            form,
            CreateSceneForm {
                name: "Sunset".to_string(),
                colours: vec!["#00FF00".to_string(), "#FF0000".to_string()],
            }
        );
    }

    #[test]
    fn test_create_form_needs_name() {
        assert!(matches!(
            CreateSceneForm::parse(&fields(&[("hexColour-1", "#FF0000")])),
            Err(SceneError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_activation_form() {
        let request = parse_activation(&fields(&[
            ("light-10", "1"),
            ("light-11", "2"),
            ("loop", "true"),
            ("transitionTime", "5"),
        ]))
        .unwrap();

        assert!(request.looping);
        assert_eq!(request.transition_secs, Some(5));
        assert_eq!(
            request.positions,
            vec![
                LightPosition {
                    light_id: "10".to_string(),
                    position: 1
                },
                LightPosition {
                    light_id: "11".to_string(),
                    position: 2
                },
            ]
        );
    }

    #[test]
    fn test_activation_form_without_loop() {
        let request = parse_activation(&fields(&[("light-10", "1"), ("loop", "false")])).unwrap();
        assert!(!request.looping);
        assert_eq!(request.transition_secs, None);
    }

    #[test]
    fn test_activation_form_rejects_garbage() {
        for bad in [
            fields(&[("light-10", "first")]),
            fields(&[("light-10", "-1")]),
            fields(&[("light-", "1")]),
            fields(&[("light-x/../../groups/0/action?", "1")]),
            fields(&[("light-10 ", "1")]),
            fields(&[("loop", "true"), ("transitionTime", "soon")]),
        ] {
            assert!(
                matches!(parse_activation(&bad), Err(SceneError::InvalidInput(_))),
                "{:?}",
                bad
            );
        }
    }
}
