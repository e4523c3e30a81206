use thiserror::Error;

#[derive(Error, Debug)]
pub enum LuasenseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Index encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("Index decoding error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Reflection error: {0}")]
    Reflection(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LuasenseError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LuasenseError::Reflection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LuasenseError>;
