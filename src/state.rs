//! Shared workflow state threaded through every step.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Kind of outreach message to personalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// First contact with a profile
    #[default]
    ConnectionRequest,

    /// Message sent after a connection was accepted
    FollowUp,

    /// Any other value; has no template set
    Other(String),
}

impl MessageType {
    /// Wire name of the message type.
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::ConnectionRequest => "connection_request",
            MessageType::FollowUp => "follow_up",
            MessageType::Other(s) => s,
        }
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s {
            "connection_request" => MessageType::ConnectionRequest,
            "follow_up" => MessageType::FollowUp,
            other => MessageType::Other(other.to_string()),
        }
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        MessageType::from(s.as_str())
    }
}

impl From<MessageType> for String {
    fn from(t: MessageType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post on the analyzed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub content: String,
    pub date: String,
}

/// One entry of the profile's work history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub years: u32,
}

/// Acquired profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub name: String,
    pub title: String,
    pub location: String,
    pub connections: u32,

    /// Most recent first
    #[serde(default)]
    pub recent_posts: Vec<Post>,

    /// Current position first
    #[serde(default)]
    pub experience: Vec<Experience>,
}

/// Insights derived from a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    pub personality_type: String,
    pub communication_style: String,
    pub interests: Vec<String>,
    pub best_contact_time: String,
    pub message_tone: String,
    pub mutual_interests: Vec<String>,
}

/// One generated, personalized message variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCandidate {
    pub id: usize,
    pub template_id: usize,
    pub content: String,
    pub tone: String,
    pub confidence_score: f64,
    pub personalization_elements: HashMap<String, String>,
}

/// Checkpoint reached by the most recent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentStep {
    Initialized,
    ProfileAnalysisComplete,
    PersonalizationComplete,
    ErrorHandled,
}

impl CurrentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentStep::Initialized => "initialized",
            CurrentStep::ProfileAnalysisComplete => "profile_analysis_complete",
            CurrentStep::PersonalizationComplete => "personalization_complete",
            CurrentStep::ErrorHandled => "error_handled",
        }
    }
}

impl fmt::Display for CurrentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing hint left by the most recent step for the orchestrator's routers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    AnalyzeProfile,
    GenerateMessages,
    ReadyForSending,
    End,
}

/// The single record flowing through the pipeline.
///
/// One instance is created per run and owned by the orchestrator until the
/// run reaches its terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub user_id: String,
    pub profile_url: String,
    pub message_type: MessageType,

    pub profile_data: Option<ProfileData>,
    pub ai_insights: Option<AiInsights>,
    pub engagement_score: Option<f64>,

    pub message_templates: Option<Vec<String>>,
    pub personalized_messages: Option<Vec<MessageCandidate>>,
    pub selected_message: Option<MessageCandidate>,

    pub current_step: CurrentStep,
    pub next_action: NextAction,

    /// Append-only within a run
    pub errors: Vec<String>,

    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl WorkflowState {
    /// Create the initial state for one run.
    pub fn new(user_id: &str, profile_url: &str, message_type: MessageType) -> Self {
        Self {
            user_id: user_id.to_string(),
            profile_url: profile_url.to_string(),
            message_type,
            profile_data: None,
            ai_insights: None,
            engagement_score: None,
            message_templates: None,
            personalized_messages: None,
            selected_message: None,
            current_step: CurrentStep::Initialized,
            next_action: NextAction::AnalyzeProfile,
            errors: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Whether any step has recorded an error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Append an error.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Workflow id assigned by the orchestrator, if any.
    pub fn workflow_id(&self) -> Option<&str> {
        self.metadata.get("workflow_id").and_then(Value::as_str)
    }
}
