use std::collections::BTreeMap;

use common::{LightId, Xy};

use crate::error::{SceneError, SceneResult};

pub mod scene_manager;
pub mod scheduler;

pub mod prelude {
    pub use super::{scene_manager::*, scheduler::*, LightAssignment};
}

/// Which colour of a scene each light is showing, as an index into the
/// scene's colour sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LightAssignment {
    indices: BTreeMap<LightId, usize>,
}

impl LightAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, light_id: &str) -> Option<usize> {
        self.indices.get(light_id).copied()
    }

    /// Checks that every index points into a sequence of `colour_count`
    /// colours, and that there is at least one colour.
    pub fn validate(&self, colour_count: usize) -> SceneResult<()> {
        if colour_count == 0 {
            return Err(SceneError::invalid("a scene needs at least one colour"));
        }

        match self.indices.iter().find(|(_, index)| **index >= colour_count) {
            Some((light_id, index)) => Err(SceneError::invalid(format!(
                "light {}: position {} is outside 1..={}",
                light_id,
                index + 1,
                colour_count
            ))),
            None => Ok(()),
        }
    }

    /// Moves every light on to the next colour, wrapping at the end.
    pub fn advance(&mut self, colour_count: usize) {
        if colour_count == 0 {
            return;
        }
        for index in self.indices.values_mut() {
            *index = (*index + 1) % colour_count;
        }
    }

    /// The colour each light should show right now.
    pub fn colours<'a>(&'a self, colours: &'a [Xy]) -> impl Iterator<Item = (&'a LightId, Xy)> + 'a {
        self.indices
            .iter()
            .filter_map(|(id, index)| colours.get(*index).map(|xy| (id, *xy)))
    }
}

impl<K: Into<LightId>> FromIterator<(K, usize)> for LightAssignment {
    fn from_iter<T: IntoIterator<Item = (K, usize)>>(iter: T) -> Self {
        Self {
            indices: iter.into_iter().map(|(id, index)| (id.into(), index)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_returns_to_start() {
        for count in 1..=6 {
            for start in 0..count {
                let mut assignment: LightAssignment = [("10", start)].into_iter().collect();
                let mut seen = vec![false; count];

                for _ in 0..count {
                    assignment.advance(count);
                    let index = assignment.get("10").unwrap();
                    assert!(index < count);
                    seen[index] = true;
                }

                assert_eq!(assignment.get("10"), Some(start));
                assert!(seen.iter().all(|s| *s), "count {} start {}", count, start);
            }
        }
    }

    #[test]
    fn test_advance_wraps_each_light() {
        let mut assignment: LightAssignment = [("10", 0), ("11", 1)].into_iter().collect();

        assignment.advance(2);
        assert_eq!(assignment.get("10"), Some(1));
        assert_eq!(assignment.get("11"), Some(0));

        assignment.advance(2);
        assert_eq!(assignment.get("10"), Some(0));
        assert_eq!(assignment.get("11"), Some(1));
    }

    #[test]
    fn test_validate() {
        let assignment: LightAssignment = [("10", 0), ("11", 2)].into_iter().collect();

        assert!(assignment.validate(3).is_ok());
        assert_eq!(
            assignment.validate(2),
            Err(SceneError::invalid("light 11: position 3 is outside 1..=2"))
        );
        assert!(matches!(
            LightAssignment::new().validate(0),
            Err(SceneError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_colours() {
        let palette = [Xy::new(0.6, 0.3), Xy::new(0.2, 0.7)];
        let assignment: LightAssignment = [("10", 1), ("11", 0)].into_iter().collect();

        let colours: Vec<(String, Xy)> = assignment
            .colours(&palette)
            .map(|(id, xy)| (id.clone(), xy))
            .collect();
        assert_eq!(
            colours,
            vec![("10".to_string(), palette[1]), ("11".to_string(), palette[0])]
        );
    }
}
