//! Configuration for building the content graph

use serde::Deserialize;
use thiserror::Error;

use crate::resolve::Severity;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse build config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Options for [`build_graph_with_config`](crate::build_graph_with_config)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Resolve entries on the rayon pool (requires the `parallel` feature)
    pub parallel: bool,

    /// Severity of a `%{ref}` directive whose target is missing
    pub template_reference_severity: Severity,

    /// Warn when an attack without a saving throw sets `effectOnSave`
    pub effect_on_save_warnings: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            template_reference_severity: Severity::Warning,
            effect_on_save_warnings: true,
        }
    }
}

impl BuildConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string; missing keys keep defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_template_reference_severity(mut self, severity: Severity) -> Self {
        self.template_reference_severity = severity;
        self
    }

    pub fn with_effect_on_save_warnings(mut self, enabled: bool) -> Self {
        self.effect_on_save_warnings = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuildConfig::default();
        assert!(config.parallel);
        assert_eq!(config.template_reference_severity, Severity::Warning);
        assert!(config.effect_on_save_warnings);
    }

    #[test]
    fn test_builder_pattern() {
        let config = BuildConfig::new()
            .with_parallel(false)
            .with_template_reference_severity(Severity::Error);
        assert!(!config.parallel);
        assert_eq!(config.template_reference_severity, Severity::Error);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = BuildConfig::from_toml(r#"template_reference_severity = "error""#)
            .expect("Should parse");
        assert_eq!(config.template_reference_severity, Severity::Error);
        assert!(config.parallel);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(BuildConfig::from_toml("paralel = false").is_err());
    }
}
