//! Registry configuration
//!
//! Configuration applies to batch construction through the context builder.
//! Plain `Context::add` is unaffected and always overwrites.
//!
//! ## TOML
//!
//! ```toml
//! duplicate_policy = "reject"
//! max_services = 64
//! ```

use crate::error::{ContextError, ContextResult};
use serde::{Deserialize, Serialize};

/// What a builder does when a tag is registered twice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last registration wins
    #[default]
    Overwrite,
    /// Second registration fails with `DuplicateService`
    Reject,
}

/// Configuration for building contexts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Duplicate handling: `"overwrite"` (default) or `"reject"`.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Maximum number of services a builder accepts (default: unbounded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_services: Option<usize>,
}

impl RegistryConfig {
    /// Configuration that rejects duplicate registrations
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            max_services: None,
        }
    }

    /// Set the maximum number of services
    pub fn with_max_services(mut self, max: usize) -> Self {
        self.max_services = Some(max);
        self
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the document does not parse or fails
    /// [`RegistryConfig::validate`].
    pub fn from_toml_str(source: &str) -> ContextResult<Self> {
        let config: RegistryConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if serialization fails.
    pub fn to_toml_string(&self) -> ContextResult<String> {
        toml::to_string(self).map_err(|e| ContextError::InvalidConfig(e.to_string()))
    }

    /// Check internal consistency
    ///
    /// A limit of zero is rejected: such a builder could never accept a service.
    pub fn validate(&self) -> ContextResult<()> {
        if self.max_services == Some(0) {
            return Err(ContextError::InvalidConfig(
                "max_services must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that a context may grow to `len` services
    pub fn check_capacity(&self, len: usize) -> ContextResult<()> {
        match self.max_services {
            Some(limit) if len > limit => Err(ContextError::CapacityExceeded { limit }),
            _ => Ok(()),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# tagctx registry configuration
#
# Duplicate policy: "overwrite" (default) or "reject"
#   "overwrite" = last registration of a tag wins
#   "reject"    = registering a tag twice is an error
duplicate_policy = "overwrite"

# Maximum number of services per built context (default: unbounded)
# max_services = 256
"#
    }
}
