use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn user_not_found(username: impl AsRef<str>) -> Self {
        Self::NotFound(format!("Can't find user by username: {}", username.as_ref()))
    }

    pub fn invitation_not_found(inviter: impl AsRef<str>) -> Self {
        Self::NotFound(format!("Can't find invitation from user: {}", inviter.as_ref()))
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
