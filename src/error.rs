use thiserror::Error;

use crate::backup::codec::DecodeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Account {0} no longer exists")]
    IncompleteData(i64),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
