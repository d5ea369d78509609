use thiserror::Error;

use crate::client::TransportError;
use crate::config::ConfigError;
use crate::feed::FeedError;

#[derive(Error, Debug)]
pub enum GalleyError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GalleyError>;
