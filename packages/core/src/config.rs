//! Engine configuration
use crate::services::error::EngineError;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_depth`
///
/// The Validator grows its stack on demand, but traversal, transform and
/// serialization of a validated tree recurse once per level. Trees this deep
/// stay within a 2 MiB thread stack in debug builds.
pub const MAX_SUPPORTED_DEPTH: usize = 1024;

/// Validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Deepest raw nesting the Validator descends into
    pub max_depth: usize,

    /// Schema versions after a promotion during which the field's old
    /// `data`-bucket representation still satisfies a required field
    pub compatibility_window: u32,

    /// Set to false to reject legacy `data` representations outright
    pub accept_legacy_data_fields: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            compatibility_window: 1,
            accept_legacy_data_fields: true,
        }
    }
}

/// Configuration for a `DocumentEngine`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidatorConfig,
}

impl EngineConfig {
    /// Parse a JSON configuration document; missing keys take defaults
    ///
    /// ```rust
    /// use oxa_core::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_json_str(r#"{"validation": {"max_depth": 64}}"#).unwrap();
    /// assert_eq!(config.validation.max_depth, 64);
    /// assert_eq!(config.validation.compatibility_window, 1);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(text)
            .map_err(|e| EngineError::config(format!("malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let depth = self.validation.max_depth;
        if depth == 0 || depth > MAX_SUPPORTED_DEPTH {
            return Err(EngineError::config(format!(
                "max_depth must be between 1 and {}, got {}",
                MAX_SUPPORTED_DEPTH, depth
            )));
        }
        Ok(())
    }
}
