//! Message personalization stage.

use crate::agent::Stage;
use crate::state::{AiInsights, CurrentStep, MessageCandidate, NextAction, ProfileData, WorkflowState};
use crate::templates::{render, TemplateCatalog};
use anyhow::Result;
use std::collections::HashMap;

/// Placeholder score given to every candidate until a real quality signal exists.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

const FALLBACK_COMPANY: &str = "your company";
const FALLBACK_TONE: &str = "professional";
const COMPANY_INITIATIVE: &str = "your latest product launch";

/// Renders one message candidate per template and selects the best.
#[derive(Debug, Clone, Default)]
pub struct Personalization {
    catalog: TemplateCatalog,
}

impl Personalization {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }
}

impl Stage for Personalization {
    fn name(&self) -> &str {
        "PersonalizationAgent"
    }

    fn run_stage(&self, state: &mut WorkflowState) -> Result<()> {
        let Some((profile, insights)) = state.profile_data.as_ref().zip(state.ai_insights.as_ref())
        else {
            state.record_error("Missing profile data or insights");
            return Ok(());
        };

        let templates = self.catalog.templates(&state.message_type);
        let candidates = personalize(templates, profile, insights)?;
        let selected = select_best(&candidates).cloned();

        tracing::debug!(
            message_type = %state.message_type,
            candidates = candidates.len(),
            selected = ?selected.as_ref().map(|c| c.id),
            "Messages personalized"
        );

        state.message_templates = Some(templates.to_vec());
        state.personalized_messages = Some(candidates);
        state.selected_message = selected;
        state.current_step = CurrentStep::PersonalizationComplete;
        state.next_action = NextAction::ReadyForSending;

        Ok(())
    }
}

/// Render every template into a candidate.
pub fn personalize(
    templates: &[String],
    profile: &ProfileData,
    insights: &AiInsights,
) -> Result<Vec<MessageCandidate>> {
    if templates.is_empty() {
        return Ok(Vec::new());
    }

    let name = first_name(profile)?;
    let company = current_company(profile);
    let industry = industry_label(profile);
    let topic = recent_topic(profile);
    let tone = if insights.message_tone.is_empty() {
        FALLBACK_TONE
    } else {
        insights.message_tone.as_str()
    };

    let mut vars = HashMap::new();
    vars.insert("name", name.to_string());
    vars.insert("company", company.to_string());
    vars.insert("industry", industry.to_string());
    vars.insert("topic", topic.to_string());
    vars.insert("industry_trend", topic.to_string());
    vars.insert("company_initiative", COMPANY_INITIATIVE.to_string());

    let elements: HashMap<String, String> = [("name", name), ("company", company), ("topic", topic)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    templates
        .iter()
        .enumerate()
        .map(|(i, template)| {
            Ok(MessageCandidate {
                id: i,
                template_id: i,
                content: render(template, &vars)?,
                tone: tone.to_string(),
                confidence_score: DEFAULT_CONFIDENCE,
                personalization_elements: elements.clone(),
            })
        })
        .collect()
}

/// Highest confidence candidate; the earliest wins ties.
pub fn select_best(candidates: &[MessageCandidate]) -> Option<&MessageCandidate> {
    candidates.iter().reduce(|best, c| {
        if c.confidence_score > best.confidence_score {
            c
        } else {
            best
        }
    })
}

fn first_name(profile: &ProfileData) -> Result<&str> {
    match profile.name.split_whitespace().next() {
        Some(name) => Ok(name),
        None => anyhow::bail!("profile has no name"),
    }
}

fn current_company(profile: &ProfileData) -> &str {
    profile
        .experience
        .first()
        .map(|e| e.company.as_str())
        .filter(|c| !c.is_empty())
        .unwrap_or(FALLBACK_COMPANY)
}

fn industry_label(profile: &ProfileData) -> &'static str {
    if profile.title.to_lowercase().contains("engineer") {
        "tech"
    } else {
        "professional"
    }
}

fn recent_topic(profile: &ProfileData) -> &'static str {
    match profile.recent_posts.first() {
        Some(post) if post.content.contains("AI") => "AI developments",
        _ => "industry trends",
    }
}
