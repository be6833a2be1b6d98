use std::sync::Arc;

use axum::{routing::get, Router};
use hue_scenes::scene::prelude::SceneManager;
use tower_http::trace::TraceLayer;

mod assets;
mod error;
mod forms;
mod handlers;
mod views;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SceneManager>,
}

impl AppState {
    pub fn new(manager: SceneManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/rooms/:room_id", get(handlers::room))
        .route("/rooms/:room_id/stop", get(handlers::stop_room))
        .route(
            "/rooms/:room_id/createscene",
            get(handlers::create_scene_form).post(handlers::create_scene),
        )
        .route(
            "/rooms/:room_id/scenes/:scene_id",
            get(handlers::scene).post(handlers::activate_scene),
        )
        .route(
            "/rooms/:room_id/scenes/:scene_id/delete",
            get(handlers::delete_scene),
        )
        .route("/static/:file", get(assets::static_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
