#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),
    #[error("Unknown completion kind: {0}")]
    UnknownKind(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
