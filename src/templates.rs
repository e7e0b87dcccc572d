//! Message template catalog.
//!
//! Templates use Handlebars syntax and are grouped into sets keyed by
//! message type:
//!
//! ```yaml
//! connection_request:
//!   - "Hi {{name}}, I noticed your work at {{company}} and would love to connect!"
//! follow_up:
//!   - "Thanks for connecting, {{name}}!"
//! ```

use crate::state::MessageType;
use anyhow::{Context as _, Result};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const CONNECTION_REQUEST: &[&str] = &[
    "Hi {{name}}, I noticed your work at {{company}} and would love to connect!",
    "Hello {{name}}, fellow {{industry}} professional here. Let's connect!",
    "Hi {{name}}, I saw your recent post about {{topic}} and found it insightful.",
];

const FOLLOW_UP: &[&str] = &[
    "Thanks for connecting, {{name}}! I'd love to learn more about {{company_initiative}}.",
    "Hi {{name}}, hope you're doing well at {{company}}. Any thoughts on {{industry_trend}}?",
];

/// Template sets keyed by message type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCatalog {
    sets: HashMap<String, Vec<String>>,
}

impl TemplateCatalog {
    /// Build a catalog from explicit sets.
    pub fn new(sets: HashMap<String, Vec<String>>) -> Self {
        Self { sets }
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        let sets = [
            (MessageType::ConnectionRequest, CONNECTION_REQUEST),
            (MessageType::FollowUp, FOLLOW_UP),
        ]
        .into_iter()
        .map(|(message_type, templates)| {
            (
                message_type.as_str().to_string(),
                templates.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
            )
        })
        .collect();

        Self::new(sets)
    }

    /// Templates for a message type; empty for unknown types.
    pub fn templates(&self, message_type: &MessageType) -> &[String] {
        self.sets
            .get(message_type.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names of all template sets.
    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Check every set name and template.
    pub fn validate(&self) -> Result<()> {
        let mut hb = Handlebars::new();

        for (name, templates) in &self.sets {
            if name.is_empty() {
                anyhow::bail!("Template set name cannot be empty");
            }
            for (i, template) in templates.iter().enumerate() {
                if template.trim().is_empty() {
                    anyhow::bail!("Template {} in set '{}' is empty", i, name);
                }
                hb.register_template_string(&format!("{name}.{i}"), template)
                    .with_context(|| format!("Template {} in set '{}' is invalid", i, name))?;
            }
        }
        Ok(())
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Render one template against personalization variables.
///
/// Rendering is strict: a placeholder with no matching variable is an error.
pub fn render(template: &str, vars: &HashMap<&str, String>) -> Result<String> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_escape_fn(handlebars::no_escape);

    hb.render_template(template, vars)
        .with_context(|| format!("Failed to render template: {template}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sets() {
        let catalog = TemplateCatalog::builtin();

        assert_eq!(catalog.templates(&MessageType::ConnectionRequest).len(), 3);
        assert_eq!(catalog.templates(&MessageType::FollowUp).len(), 2);
        assert!(catalog
            .templates(&MessageType::Other("inmail".to_string()))
            .is_empty());
        catalog.validate().unwrap();
        assert_eq!(
            catalog.templates(&MessageType::FollowUp)[1],
            "Hi {{name}}, hope you're doing well at {{company}}. Any thoughts on {{industry_trend}}?"
        );
    }

    #[test]
    fn test_render_without_escaping() {
        let mut vars = HashMap::new();
        vars.insert("name", "Jane".to_string());
        vars.insert("company", "Smith & Sons".to_string());

        let rendered = render("Hi {{name}}, I noticed your work at {{company}}!", &vars).unwrap();
        assert_eq!(rendered, "Hi Jane, I noticed your work at Smith & Sons!");
    }

    #[test]
    fn test_render_missing_variable() {
        let vars = HashMap::new();
        let result = render("Hi {{name}}", &vars);

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_template() {
        let mut sets = HashMap::new();
        sets.insert("connection_request".to_string(), vec!["  ".to_string()]);

        let err = TemplateCatalog::new(sets).validate().unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_validate_rejects_broken_template() {
        let mut sets = HashMap::new();
        sets.insert("follow_up".to_string(), vec!["Hi {{name".to_string()]);

        let err = TemplateCatalog::new(sets).validate().unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_catalog_from_yaml() {
        let yaml = r#"
inmail:
  - "Hello {{name}}"
"#;
        let catalog: TemplateCatalog = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            catalog.templates(&MessageType::from("inmail")),
            &["Hello {{name}}".to_string()]
        );
        assert_eq!(catalog.set_names().collect::<Vec<_>>(), vec!["inmail"]);
    }
}
