use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
