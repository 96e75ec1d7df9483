use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PumpConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Items streamed from the producer to the consumer.
    #[serde(default = "defaults::item_count")]
    pub item_count: u64,
    /// Items the producer publishes per step.
    #[serde(default = "defaults::produce_chunk")]
    pub produce_chunk: usize,
    /// Items the consumer releases per step.
    #[serde(default = "defaults::consume_chunk")]
    pub consume_chunk: usize,
    /// Ring size in units of `lcm(produce_chunk, consume_chunk)`.
    #[serde(default = "defaults::chunks_in_flight")]
    pub chunks_in_flight: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn item_count() -> u64 {
        1_000_000
    }

    pub fn produce_chunk() -> usize {
        64
    }

    pub fn consume_chunk() -> usize {
        48
    }

    pub fn chunks_in_flight() -> usize {
        8
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            item_count: defaults::item_count(),
            produce_chunk: defaults::produce_chunk(),
            consume_chunk: defaults::consume_chunk(),
            chunks_in_flight: defaults::chunks_in_flight(),
        }
    }
}

impl PumpConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&toml_to_str)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let pump_config: PumpConfig = toml::from_str(s)?;
        pump_config.validate()?;
        Ok(pump_config)
    }

    /// Rejects settings the pump cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.produce_chunk == 0 || self.consume_chunk == 0 {
            return Err(ConfigError::Invalid("chunk sizes must be non-zero".into()));
        }
        // The ring holds chunks_in_flight blocks minus the guard slot, so one
        // block is not enough to fit a whole chunk of either side.
        if self.chunks_in_flight < 2 {
            return Err(ConfigError::Invalid(format!(
                "chunks_in_flight must be at least 2, got {}",
                self.chunks_in_flight
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = PumpConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PumpConfig::default());
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.produce_chunk, 64);
        assert_eq!(cfg.consume_chunk, 48);
    }

    #[test]
    fn fields_override_defaults() {
        let cfg = PumpConfig::from_toml_str(
            r#"
            log_level = "debug"
            item_count = 500
            produce_chunk = 10
            consume_chunk = 4
            chunks_in_flight = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.item_count, 500);
        assert_eq!(cfg.produce_chunk, 10);
        assert_eq!(cfg.consume_chunk, 4);
        assert_eq!(cfg.chunks_in_flight, 3);
    }

    #[test]
    fn zero_chunk_is_rejected() {
        let err = PumpConfig::from_toml_str("consume_chunk = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn single_block_is_rejected() {
        let err = PumpConfig::from_toml_str("chunks_in_flight = 1").unwrap_err();
        assert!(err.to_string().contains("chunks_in_flight"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = PumpConfig::from_toml_str("item_count = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = PumpConfig::from_toml_str("shm_file_path = \"/tmp/x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PumpConfig::load("/nonexistent/cadence/pump.toml").unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert_eq!(path, "/nonexistent/cadence/pump.toml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
