pub mod config;
mod onewire_app;

pub use config::{AppConfig, ConfigError};
pub use onewire_app::{OnewireApp, SetupError};
