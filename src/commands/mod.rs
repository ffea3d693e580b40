pub mod catalog;
pub mod serve;
pub mod uploads;

use crate::error::{Result, ScenebotError};

/// Runtime for commands that talk to the network
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ScenebotError::Config(format!("tokio runtime: {}", e)))
}
