//! Configuration for a scan

use serde::{Deserialize, Serialize};

/// Configuration for the dispatcher and its plugins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Lines read per verification attempt on text sources
    pub probe_line_count: usize,

    /// Verification attempts per text plugin; each attempt widens the sample
    pub max_probe_attempts: usize,

    /// Longest line considered during probing (bytes); longer lines are truncated
    pub max_line_length: usize,

    /// Restrict the scan to these plugin names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_plugins: Option<Vec<String>>,

    /// Sources scanned concurrently by the outer driver
    pub max_parallel_sources: usize,
}

impl ScanConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.probe_line_count == 0 {
            return Err("probe_line_count must be greater than 0".to_string());
        }
        if self.max_probe_attempts == 0 {
            return Err("max_probe_attempts must be greater than 0".to_string());
        }
        if self.max_line_length == 0 {
            return Err("max_line_length must be greater than 0".to_string());
        }
        if self.max_parallel_sources == 0 {
            return Err("max_parallel_sources must be greater than 0".to_string());
        }
        if let Some(plugins) = &self.enabled_plugins {
            if plugins.is_empty() {
                return Err("enabled_plugins must name at least one plugin".to_string());
            }
        }
        Ok(())
    }

    /// Upper bound on lines read by the verification probe
    pub fn probe_window(&self) -> usize {
        self.probe_line_count.saturating_mul(self.max_probe_attempts)
    }
}

impl Default for ScanConfig {
    /// Default configuration with a small probe window
    fn default() -> Self {
        Self {
            probe_line_count: 10,
            max_probe_attempts: 3,
            max_line_length: 4096,
            enabled_plugins: None,
            max_parallel_sources: 4,
        }
    }
}

impl ScanConfig {
    /// Thorough preset: larger probe window for sources with long preambles
    pub fn thorough() -> Self {
        Self {
            probe_line_count: 50,
            max_probe_attempts: 5,
            max_line_length: 16_384,
            enabled_plugins: None,
            max_parallel_sources: 2,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
        assert_eq!(ScanConfig::default().probe_window(), 30);
    }

    #[test]
    fn test_thorough_config_is_valid() {
        assert!(ScanConfig::thorough().validate().is_ok());
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let mut config = ScanConfig::default();
        config.probe_line_count = 0;
        assert!(config.validate().is_err());

        let mut config = ScanConfig::default();
        config.max_parallel_sources = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_plugin_list_is_rejected() {
        let config = ScanConfig {
            enabled_plugins: Some(Vec::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ScanConfig {
            enabled_plugins: Some(vec!["bash".to_string()]),
            ..Default::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = ScanConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ScanConfig::from_toml("probe_line_count = 5").unwrap();
        assert_eq!(config.probe_line_count, 5);
        assert_eq!(config.max_probe_attempts, 3);
        assert!(config.enabled_plugins.is_none());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(ScanConfig::from_toml("probe_line_count = \"ten\"").is_err());
    }
}
