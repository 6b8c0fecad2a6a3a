use thiserror::Error;

/// タイムラインコアのエラー。致命的なものはなく、すべて「次のフェッチで回復する」前提。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::InvalidInput(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
