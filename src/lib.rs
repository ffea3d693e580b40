// Library interface for scenebot
pub mod bot;
pub mod catalog;
pub mod config;
pub mod error;
pub mod intent;
pub mod logging;
pub mod renderer;
pub mod telegram;
pub mod uploads;

// Re-export commonly used types
pub use catalog::{Artifact, Catalog, CatalogResolver, Source};
pub use config::Config;
pub use error::{Result, ScenebotError};
