//! YAML configuration parser.

use crate::config::OrchestratorConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse orchestrator configuration from a YAML string.
///
/// # Example
///
/// ```rust
/// use linked_intelligence::parse_yaml;
///
/// let yaml = r#"
/// max_steps: 8
/// default_message_type: follow_up
/// templates:
///   follow_up:
///     - "Thanks for connecting, {{name}}!"
/// "#;
///
/// let config = parse_yaml(yaml).unwrap();
/// assert_eq!(config.max_steps, 8);
/// assert_eq!(config.default_message_type.as_str(), "follow_up");
/// ```
pub fn parse_yaml(yaml: &str) -> Result<OrchestratorConfig> {
    let config: OrchestratorConfig =
        serde_yaml::from_str(yaml).context("Failed to parse orchestrator config YAML")?;

    config.validate()?;

    Ok(config)
}

/// Load and parse orchestrator configuration from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use linked_intelligence::yaml::load_file;
///
/// let config = load_file("orchestrator.yaml")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_file(path: impl AsRef<Path>) -> Result<OrchestratorConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_yaml(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MessageType;

    #[test]
    fn test_parse_empty_document_uses_defaults() {
        let config = parse_yaml("{}").unwrap();

        assert_eq!(config, OrchestratorConfig::default());
    }

    #[test]
    fn test_parse_custom_templates() {
        let yaml = r#"
templates:
  connection_request:
    - "Hi {{name}}!"
  inmail:
    - "Hello {{name}}, about {{topic}}"
    - "Hi {{name}}, saw you at {{company}}"
"#;

        let config = parse_yaml(yaml).unwrap();
        assert_eq!(config.max_steps, 16);
        assert_eq!(
            config.templates.templates(&MessageType::ConnectionRequest).len(),
            1
        );
        assert_eq!(config.templates.templates(&MessageType::from("inmail")).len(), 2);
        assert!(config.templates.templates(&MessageType::FollowUp).is_empty());
    }

    #[test]
    fn test_validate_short_step_bound() {
        for yaml in ["max_steps: 0", "max_steps: 2"] {
            let result = parse_yaml(yaml);

            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("at least 3"));
        }

        assert_eq!(parse_yaml("max_steps: 3").unwrap().max_steps, 3);
    }

    #[test]
    fn test_validate_empty_template() {
        let yaml = r#"
templates:
  follow_up:
    - ""
"#;

        let result = parse_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("is empty"));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_yaml("max_steps: [not, a, number]");

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse orchestrator config YAML"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_file("/nonexistent/orchestrator.yaml");

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }
}
