//! Configuration for the Lot Sequencing subsystem

use serde::{Deserialize, Serialize};

/// Sequencing configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencingConfig {
    /// Maximum lots touched by one reorder or renumber request
    pub max_batch_size: usize,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequencingConfig::default();
        assert_eq!(config.max_batch_size, 1000);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SequencingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SequencingConfig::default());
    }
}
