//! Orchestrator configuration.

use crate::state::MessageType;
use crate::templates::TemplateCatalog;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default bound on node visits per run.
pub const DEFAULT_MAX_STEPS: usize = 16;

/// Smallest accepted bound: the longest path through the workflow graph
/// (profile analysis, personalization, error handler).
pub const MIN_MAX_STEPS: usize = 3;

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

/// Configuration for an [`Orchestrator`](crate::Orchestrator).
///
/// Every field is optional in YAML; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Node visits allowed per run before it is stopped with an error
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Message type used when a request does not name one
    #[serde(default)]
    pub default_message_type: MessageType,

    /// Message templates by message type
    #[serde(default)]
    pub templates: TemplateCatalog,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            default_message_type: MessageType::default(),
            templates: TemplateCatalog::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Check the step bound and every template.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps < MIN_MAX_STEPS {
            anyhow::bail!(
                "max_steps must be at least {}, got {}",
                MIN_MAX_STEPS,
                self.max_steps
            );
        }

        self.templates.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();

        assert_eq!(config.max_steps, 16);
        assert_eq!(config.default_message_type, MessageType::ConnectionRequest);
        assert_eq!(config.templates, TemplateCatalog::builtin());
    }

    #[test]
    fn test_validate_step_bound() {
        OrchestratorConfig::default().validate().unwrap();

        for max_steps in [0, 1, 2] {
            let config = OrchestratorConfig {
                max_steps,
                ..OrchestratorConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("at least 3"));
        }

        let config = OrchestratorConfig {
            max_steps: MIN_MAX_STEPS,
            ..OrchestratorConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_templates() {
        let mut sets = HashMap::new();
        sets.insert("follow_up".to_string(), vec!["Hi {{name".to_string()]);
        let config = OrchestratorConfig {
            templates: TemplateCatalog::new(sets),
            ..OrchestratorConfig::default()
        };

        assert!(config.validate().is_err());
    }
}
