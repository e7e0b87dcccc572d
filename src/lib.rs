//! # linked-intelligence
//!
//! Profile analysis and message personalization workflow.
//!
//! A profile URL is run through a small state machine: profile analysis,
//! then message personalization, with an error handler reached whenever a
//! stage records an error. Failures never escape a run; they are collected
//! in [`WorkflowState::errors`].
//!
//! ## Quick Start
//!
//! ```rust
//! use linked_intelligence::{MessageType, Orchestrator};
//!
//! let orchestrator = Orchestrator::new();
//! let state = orchestrator.process_profile(
//!     "user-1",
//!     "https://linkedin.com/in/test",
//!     MessageType::FollowUp,
//! );
//!
//! assert!(state.errors.is_empty());
//! assert_eq!(state.engagement_score, Some(0.6));
//! ```
//!
//! ## YAML Configuration
//!
//! ```yaml
//! max_steps: 16
//! default_message_type: connection_request
//! templates:
//!   connection_request:
//!     - "Hi {{name}}, I noticed your work at {{company}} and would love to connect!"
//!   follow_up:
//!     - "Thanks for connecting, {{name}}!"
//! ```

mod agent;
mod api;
mod config;
mod error;
mod executor;
mod graph;
mod orchestrator;
mod personalization;
mod profile;
mod state;
mod templates;
pub mod yaml;

pub use agent::{Stage, StepAgent};
pub use api::{Analysis, AnalyzeRequest, AnalyzeResponse, ProfileRecord};
pub use config::{OrchestratorConfig, DEFAULT_MAX_STEPS, MIN_MAX_STEPS};
pub use error::{GraphError, RequestError};
pub use executor::{execute, ExecutionResult, StepRecord};
pub use graph::{Edge, Graph, GraphBuilder, Next, Node, NodeId, Router, Transition};
pub use orchestrator::{
    route_after_personalization, route_after_profile_analysis, ErrorHandler, Invocations,
    Orchestrator,
};
pub use personalization::{personalize, select_best, Personalization, DEFAULT_CONFIDENCE};
pub use profile::{derive_insights, engagement_score, MockProfileSource, ProfileAnalysis, ProfileSource};
pub use state::{
    AiInsights, CurrentStep, Experience, MessageCandidate, MessageType, NextAction, Post,
    ProfileData, WorkflowState,
};
pub use templates::{render, TemplateCatalog};
pub use yaml::parse_yaml;

/// Re-export common types
pub use serde_json::Value;
