//! Cache error types.
//!
//! These errors stay internal to the crate: the public cache surface degrades
//! to `false`/`None`/default values instead of propagating failures, because
//! the app must remain fully functional with an empty cache.

use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache configuration: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] BridgeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
