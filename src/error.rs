// src/error.rs

/// Result type alias for the gesture control library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the boundaries of the gesture engine.
///
/// Classification and debouncing never fail; everything here comes from a
/// collaborator (camera, landmark helper, replay file) or from configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid landmark snapshot: expected {expected} joints, got {actual}")]
    InvalidSnapshot { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Landmark bridge error: {0}")]
    Bridge(String),

    #[error("Replay error on line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
