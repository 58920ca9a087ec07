//! Tunables for tutor discovery.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for [`TutorDiscoveryEngine`](crate::discovery::TutorDiscoveryEngine).
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
///
/// ```
/// use tutorgraph::DiscoveryConfig;
///
/// let config = DiscoveryConfig::from_json_str(r#"{"time_budget_ms": 250}"#).unwrap();
/// assert_eq!(config.max_hops_limit, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Largest `max_hops` a caller may ask for. Unbounded when unset.
    pub max_hops_limit: Option<usize>,
    /// Wall-clock budget for one search, in milliseconds
    pub time_budget_ms: Option<u64>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            max_hops_limit: None,
            time_budget_ms: None,
        }
    }
}

impl DiscoveryConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] for malformed JSON and
    /// [`GraphError::InvalidArgument`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DiscoveryConfig = serde_json::from_str(json)
            .map_err(|e| GraphError::serialization("Failed to parse discovery config", Some(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_hops_limit == Some(0) {
            return Err(GraphError::invalid_argument(
                "max_hops_limit must be at least 1",
            ));
        }
        Ok(())
    }

    /// The search budget as a `Duration`, if one is set.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}
