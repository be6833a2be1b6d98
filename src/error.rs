use std::fmt::{self, Display};

pub type SceneResult<T> = Result<T, SceneError>;

/// Failures the scene controller can report to a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Malformed form data, out-of-range positions, empty colour lists,
    /// non-positive periods.
    InvalidInput(String),
    /// A room, scene or light id that nothing knows about.
    NotFound(String),
    /// The bridge or the database is unreachable or answered with an error.
    UpstreamUnavailable(String),
}

impl SceneError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SceneError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SceneError::NotFound(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        SceneError::UpstreamUnavailable(message.into())
    }
}

impl Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            SceneError::NotFound(msg) => write!(f, "not found: {}", msg),
            SceneError::UpstreamUnavailable(msg) => write!(f, "upstream unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<reqwest::Error> for SceneError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SceneError::upstream(format!("bridge timed out: {}", err))
        } else {
            SceneError::upstream(format!("bridge request failed: {}", err))
        }
    }
}

impl From<sqlx::Error> for SceneError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => SceneError::not_found("no such row"),
            other => SceneError::upstream(format!("database error: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(
            SceneError::from(sqlx::Error::RowNotFound),
            SceneError::NotFound("no such row".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SceneError::invalid("empty colour list").to_string(),
            "invalid input: empty colour list"
        );
    }
}
