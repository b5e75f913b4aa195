//! Engine configuration.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings a `Workbook` and `Registry` run with. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dependency hops an edit propagates through. 0 disables propagation.
    pub propagation_depth: usize,
    /// Whether tree-bound factories fold constant subtrees.
    pub optimize_trees: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { propagation_depth: 1, optimize_trees: true }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case("{}", EngineConfig::default())]
    #[case(r#"{"propagation_depth": 3}"#, EngineConfig { propagation_depth: 3, optimize_trees: true })]
    #[case(r#"{"optimize_trees": false}"#, EngineConfig { propagation_depth: 1, optimize_trees: false })]
    fn test_defaults_fill_missing_keys(#[case] json: &str, #[case] expected: EngineConfig) {
        assert_eq!(EngineConfig::from_json_str(json).unwrap(), expected);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(EngineConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"propagation_depth": 0}}"#).unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.propagation_depth, 0);

        let missing = file.path().with_extension("missing");
        assert!(matches!(EngineConfig::from_path(missing), Err(ConfigError::Io(_))));
    }
}
