use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use common::{RoomId, SceneId};
use tracing::info;

use crate::{
    error::AppError,
    forms::{self, CreateSceneForm},
    views, AppState,
};

type Page = Result<Html<String>, AppError>;

pub async fn index(State(state): State<AppState>) -> Page {
    let rooms = state.manager.rooms().await?;
    Ok(Html(views::home(&rooms)))
}

pub async fn room(State(state): State<AppState>, Path(room_id): Path<RoomId>) -> Page {
    let overview = state.manager.room_overview(&room_id).await?;
    Ok(Html(views::room(&overview)))
}

pub async fn stop_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Redirect, AppError> {
    if state.manager.stop(&room_id).await {
        info!("⏹️  Stopped loop in room {}", room_id);
    }
    Ok(Redirect::to(&format!("/rooms/{}", room_id)))
}

pub async fn create_scene_form(State(state): State<AppState>, Path(room_id): Path<RoomId>) -> Page {
    let lights = state.manager.room_lights(&room_id).await?;
    Ok(Html(views::create_scene(&room_id, &lights)))
}

pub async fn create_scene(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let form = CreateSceneForm::parse(&fields)?;
    let scene_id = state
        .manager
        .create_scene(&room_id, &form.name, &form.colours)
        .await?;

    Ok(Redirect::to(&format!("/rooms/{}/scenes/{}", room_id, scene_id)))
}

pub async fn scene(
    State(state): State<AppState>,
    Path((room_id, scene_id)): Path<(RoomId, SceneId)>,
) -> Page {
    let detail = state.manager.scene_detail(&room_id, scene_id).await?;
    Ok(Html(views::scene(&room_id, &detail, None)))
}

pub async fn activate_scene(
    State(state): State<AppState>,
    Path((room_id, scene_id)): Path<(RoomId, SceneId)>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Page {
    let request = forms::parse_activation(&fields)?;
    let status = match (request.looping, request.transition_secs) {
        (true, Some(secs)) => format!("Looping every {} s.", secs),
        _ => "Scene applied.".to_string(),
    };

    info!(
        "🎨 Activating scene {} in room {} ({} lights, loop: {})",
        scene_id,
        room_id,
        request.positions.len(),
        request.looping
    );
    state.manager.activate(&room_id, scene_id, request).await?;

    let detail = state.manager.scene_detail(&room_id, scene_id).await?;
    Ok(Html(views::scene(&room_id, &detail, Some(&status))))
}

pub async fn delete_scene(
    State(state): State<AppState>,
    Path((room_id, scene_id)): Path<(RoomId, SceneId)>,
) -> Result<Redirect, AppError> {
    state.manager.delete_scene(&room_id, scene_id).await?;
    Ok(Redirect::to(&format!("/rooms/{}", room_id)))
}
