//! Request and response contract for invoking the workflow from a service layer.

use crate::error::RequestError;
use crate::orchestrator::Orchestrator;
use crate::state::{AiInsights, MessageCandidate, MessageType, ProfileData, WorkflowState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Body of an analyze-profile request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub profile_url: Option<String>,

    #[serde(default)]
    pub message_type: Option<MessageType>,
}

impl AnalyzeRequest {
    /// Profile URL, rejecting a missing or blank one.
    pub fn profile_url(&self) -> Result<&str, RequestError> {
        match self.profile_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(RequestError::MissingProfileUrl),
        }
    }
}

/// Workflow outputs surfaced to the end user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub profile_data: Option<ProfileData>,
    pub ai_insights: Option<AiInsights>,
    pub engagement_score: Option<f64>,
    pub personalized_messages: Option<Vec<MessageCandidate>>,
    pub selected_message: Option<MessageCandidate>,
}

/// Response to an analyze-profile request.
///
/// A run that recorded errors still produces a response, with `status`
/// set to `"error"` and the full error list attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub analysis: Analysis,
    pub workflow_metadata: HashMap<String, Value>,
    pub errors: Vec<String>,
}

impl AnalyzeResponse {
    pub fn from_state(state: &WorkflowState) -> Self {
        let status = if state.has_errors() { "error" } else { "success" };

        Self {
            status: status.to_string(),
            analysis: Analysis {
                profile_data: state.profile_data.clone(),
                ai_insights: state.ai_insights.clone(),
                engagement_score: state.engagement_score,
                personalized_messages: state.personalized_messages.clone(),
                selected_message: state.selected_message.clone(),
            },
            workflow_metadata: state.metadata.clone(),
            errors: state.errors.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Analysis results to persist for a user, keyed by profile URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,
    pub profile_url: String,
    pub profile_data: Option<ProfileData>,
    pub ai_insights: Option<AiInsights>,
    pub engagement_score: f64,
}

impl From<&WorkflowState> for ProfileRecord {
    fn from(state: &WorkflowState) -> Self {
        Self {
            user_id: state.user_id.clone(),
            profile_url: state.profile_url.clone(),
            profile_data: state.profile_data.clone(),
            ai_insights: state.ai_insights.clone(),
            engagement_score: state.engagement_score.unwrap_or(0.0),
        }
    }
}

impl Orchestrator {
    /// Validate a request, run the workflow and shape the response.
    ///
    /// Only request validation can fail; workflow problems are reported in
    /// the response's `errors`.
    pub fn analyze(
        &self,
        user_id: &str,
        request: &AnalyzeRequest,
    ) -> Result<(AnalyzeResponse, ProfileRecord), RequestError> {
        let profile_url = request.profile_url()?;
        let message_type = request
            .message_type
            .clone()
            .unwrap_or_else(|| self.config().default_message_type.clone());

        let state = self.process_profile(user_id, profile_url, message_type);

        Ok((AnalyzeResponse::from_state(&state), ProfileRecord::from(&state)))
    }
}
