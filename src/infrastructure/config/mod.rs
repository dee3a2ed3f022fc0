//! Configuration loading.

pub mod loader;
pub mod regions;

pub use loader::{ConfigError, ConfigLoader};
pub use regions::load_regions;
