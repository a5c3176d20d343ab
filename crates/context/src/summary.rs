//! Serializable description of a Context
//!
//! Services themselves are opaque; the summary lists which tags are bound
//! and to what type, sorted by tag identity so output is stable.

use crate::context::Context;
use serde::{Deserialize, Serialize};

/// One bound service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    /// Display form of the tag
    pub tag: String,
    /// Global key rendered as text, for global tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Type name of the stored value
    pub service_type: String,
}

/// All bound services of a context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    /// Bound services, ordered by tag identity
    pub services: Vec<ServiceSummary>,
}

impl ContextSummary {
    /// Global keys bound in the context, in summary order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.services.iter().filter_map(|s| s.key.as_deref())
    }
}

impl Context {
    /// Describe the bound services
    pub fn summary(&self) -> ContextSummary {
        let services = self
            .sorted_entries()
            .into_iter()
            .map(|entry| ServiceSummary {
                tag: entry.tag.to_string(),
                key: entry.tag.key().map(|key| key.to_string()),
                service_type: entry.value.type_name().to_string(),
            })
            .collect();
        ContextSummary { services }
    }
}
