use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HuffpackError, Result};
use crate::huffman::MAX_CODE_LENGTH;

/// Default cap on code lengths for trained codecs.
pub const DEFAULT_MAXIMUM_LENGTH: u8 = 16;

/// Parameters used when training code tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Longest code any symbol may receive.
    pub maximum_length: u8,
    /// Shortest code any symbol may receive.
    pub minimum_length: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            maximum_length: DEFAULT_MAXIMUM_LENGTH,
            minimum_length: 1,
        }
    }
}

impl CodecConfig {
    pub fn with_maximum_length(mut self, maximum_length: u8) -> Self {
        self.maximum_length = maximum_length;
        self
    }

    pub fn with_minimum_length(mut self, minimum_length: u8) -> Self {
        self.minimum_length = minimum_length;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.maximum_length == 0 || self.maximum_length > MAX_CODE_LENGTH {
            return Err(HuffpackError::Config(format!(
                "maximum_length must be within 1..={MAX_CODE_LENGTH}, got {}",
                self.maximum_length
            )));
        }
        if self.minimum_length == 0 || self.minimum_length > self.maximum_length {
            return Err(HuffpackError::Config(format!(
                "minimum_length must be within 1..={}, got {}",
                self.maximum_length, self.minimum_length
            )));
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file. Missing keys keep their
    /// defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CodecConfig::default();
        assert_eq!(config.maximum_length, 16);
        assert_eq!(config.minimum_length, 1);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        assert!(CodecConfig::default().with_maximum_length(0).validate().is_err());
        assert!(CodecConfig::default().with_maximum_length(65).validate().is_err());
        assert!(CodecConfig::default()
            .with_maximum_length(4)
            .with_minimum_length(5)
            .validate()
            .is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codec.json");
        std::fs::write(&path, r#"{ "maximum_length": 8 }"#).unwrap();
        let config = CodecConfig::from_json_file(&path).unwrap();
        assert_eq!(config, CodecConfig::default().with_maximum_length(8));

        std::fs::write(&path, r#"{ "maximum_length": 80 }"#).unwrap();
        assert!(matches!(
            CodecConfig::from_json_file(&path),
            Err(HuffpackError::Config(_))
        ));
    }
}
