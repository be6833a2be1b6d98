use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct StaticAsset;

pub async fn static_file(Path(file): Path<String>) -> Response {
    match StaticAsset::get(&file) {
        Some(asset) => (
            [(header::CONTENT_TYPE, asset.metadata.mimetype().to_string())],
            asset.data.into_owned(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
