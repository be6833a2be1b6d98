pub mod bridge;
pub mod colour;
pub mod config;
pub mod error;
pub mod scene;
pub mod store;

pub mod prelude {
    pub use crate::{
        bridge::{HueBridge, LightBridge, MemoryBridge},
        config::*,
        error::*,
        scene::prelude::*,
        store::{MemoryStore, MySqlStore, SceneStore},
    };
}
