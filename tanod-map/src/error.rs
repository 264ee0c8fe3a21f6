//! Map layer errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Malformed tracking message: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type MapResult<T> = Result<T, MapError>;
