//! Engine configuration.
//!
//! Settings come from defaults, environment-style key lookups, or (with the
//! `interchange` feature) a YAML document:
//!
//! ```yaml
//! service_mode: singleton
//! deployment_id: hr-kjar
//! form_suffix: -taskform
//! ```

use thiserror::Error;
use tracing::warn;

use crate::base::constants::{DEFAULT_DEPLOYMENT_ID, DEFAULT_FORM_SUFFIX};
use crate::hir::BuildOptions;
use crate::provider::ServiceMode;

/// Lookup key for [`EngineConfig::service_mode`].
pub const ENV_SERVICE_MODE: &str = "BPMN_META_SERVICE_MODE";
/// Lookup key for [`EngineConfig::deployment_id`].
pub const ENV_DEPLOYMENT_ID: &str = "BPMN_META_DEPLOYMENT_ID";
/// Lookup key for [`EngineConfig::form_suffix`].
pub const ENV_FORM_SUFFIX: &str = "BPMN_META_FORM_SUFFIX";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for `{key}`: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[cfg(feature = "interchange")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[cfg(feature = "interchange")]
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default, deny_unknown_fields))]
pub struct EngineConfig {
    pub service_mode: ServiceMode,
    /// Deployment unit reported for definitions analysed outside a deployment.
    pub deployment_id: String,
    /// Appended to a user task's name to form its default form.
    pub form_suffix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_mode: ServiceMode::default(),
            deployment_id: DEFAULT_DEPLOYMENT_ID.to_string(),
            form_suffix: DEFAULT_FORM_SUFFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read settings through `lookup`, keeping defaults for absent keys.
    ///
    /// An unrecognised service mode falls back to `new` with a warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SERVICE_MODE) {
            config.service_mode = match value.parse() {
                Ok(mode) => mode,
                Err(err) => {
                    warn!(key = ENV_SERVICE_MODE, error = %err, "falling back to default service mode");
                    ServiceMode::default()
                }
            };
        }
        if let Some(value) = lookup(ENV_DEPLOYMENT_ID) {
            config.deployment_id = value;
        }
        if let Some(value) = lookup(ENV_FORM_SUFFIX) {
            config.form_suffix = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(feature = "interchange")]
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "interchange")]
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            form_suffix: self.form_suffix.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.deployment_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_DEPLOYMENT_ID,
                value: self.deployment_id.clone(),
                reason: "deployment id must not be empty",
            });
        }
        if self.form_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_FORM_SUFFIX,
                value: self.form_suffix.clone(),
                reason: "form suffix must not be empty",
            });
        }
        Ok(())
    }
}
