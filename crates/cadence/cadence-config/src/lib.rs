mod config;

pub use config::{ConfigError, PumpConfig};
