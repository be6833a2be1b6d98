use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use hue_scenes::error::SceneError;
use tracing::{error, warn};

use crate::views;

/// A failed request. Rendered as a short HTML page with a status code that
/// tells bad input, unknown ids and upstream trouble apart.
#[derive(Debug)]
pub struct AppError(pub SceneError);

impl From<SceneError> for AppError {
    fn from(err: SceneError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SceneError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SceneError::NotFound(_) => StatusCode::NOT_FOUND,
            SceneError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            error!("{}", self.0);
        } else {
            warn!("{}", self.0);
        }

        (status, Html(views::error_page(status, &self.0))).into_response()
    }
}
