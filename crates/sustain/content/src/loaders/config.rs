//! Engine configuration loader.

use std::path::Path;

use sustain_core::{SustainConfig, SustainError};

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a configuration from a TOML file.
    ///
    /// Sections and fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<SustainConfig> {
        let content = read_file(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!("ConfigLoader: loaded {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration TOML.
    pub fn parse(content: &str) -> LoadResult<SustainConfig> {
        let config: SustainConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config [{}]: {}", e.error_code(), e))?;
        Ok(config)
    }
}
