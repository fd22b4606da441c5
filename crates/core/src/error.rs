use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid content: {0}")]
    InvalidContent(String),
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}
