pub mod light;
pub mod scene;

pub use light::*;
pub use scene::*;
