//! Compression configuration
//!
//! Settings are plain data with serde support so they can be embedded in a
//! storage engine's own configuration or loaded from a JSON file.

use crate::common::allocator::MemoryPool;
use crate::common::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_POOL_NAME, MAX_BLOCK_SIZE};
use crate::common::error::{PrismPackError, PrismPackResult};
use crate::storage::compression::types::EncodingType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings used when encoding segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Values per block for block codecs
    pub block_size: usize,
    /// Encoding used when the caller does not pick one
    pub default_encoding: EncodingType,
    /// Verify every freshly encoded vector against its input
    pub verify_on_encode: bool,
    /// Byte budget of the default memory pool (None for unbounded)
    pub pool_budget: Option<usize>,
}

impl CompressionConfig {
    /// Parse a configuration from JSON text and validate it
    pub fn from_json_str(json: &str) -> PrismPackResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> PrismPackResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> PrismPackResult<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(PrismPackError::Config(format!(
                "block_size must be in [1, {}], got {}",
                MAX_BLOCK_SIZE, self.block_size
            )));
        }
        if self.default_encoding == EncodingType::External {
            return Err(PrismPackError::Config(
                "default_encoding cannot be External; external codecs are passed explicitly"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Memory pool honoring `pool_budget`
    pub fn create_pool(&self) -> MemoryPool {
        MemoryPool::new(DEFAULT_POOL_NAME, self.pool_budget)
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            block_size: DEFAULT_BLOCK_SIZE,
            default_encoding: EncodingType::Bitpacking,
            verify_on_encode: false,
            pool_budget: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = CompressionConfig::from_json_str(r#"{"block_size": 128}"#).unwrap();
        assert_eq!(config.block_size, 128);
        assert_eq!(config.default_encoding, EncodingType::Bitpacking);
        assert!(!config.verify_on_encode);
        assert_eq!(config.pool_budget, None);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            CompressionConfig::from_json_str(r#"{"block_size": 0}"#),
            Err(PrismPackError::Config(_))
        ));
        assert!(matches!(
            CompressionConfig::from_json_str(r#"{"default_encoding": "External"}"#),
            Err(PrismPackError::Config(_))
        ));
        assert!(matches!(
            CompressionConfig::from_json_str("{"),
            Err(PrismPackError::Serialization(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_encoding": "VarByte", "verify_on_encode": true, "pool_budget": 4096}}"#
        )
        .unwrap();

        let config = CompressionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_encoding, EncodingType::VarByte);
        assert!(config.verify_on_encode);
        assert_eq!(config.create_pool().budget(), Some(4096));
    }

    #[test]
    fn test_missing_file() {
        let result = CompressionConfig::from_file("/nonexistent/prismpack.json");
        assert!(matches!(result, Err(PrismPackError::Io(_))));
    }
}
