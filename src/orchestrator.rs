//! Profile workflow orchestrator.
//!
//! Wires the two stages and the error handler into a graph:
//!
//! ```text
//! profile_analysis --errors--> error_handler --> end
//!        |  \--generate_messages--> personalization --errors--> error_handler
//!        end                               \--> end
//! ```

use crate::agent::StepAgent;
use crate::config::OrchestratorConfig;
use crate::error::GraphError;
use crate::executor::{self, ExecutionResult};
use crate::graph::{Graph, Next, Node, NodeId};
use crate::personalization::Personalization;
use crate::profile::{MockProfileSource, ProfileAnalysis, ProfileSource};
use crate::state::{CurrentStep, MessageType, NextAction, WorkflowState};
use serde_json::Value;
use std::sync::Arc;

/// Terminal step reached whenever a stage recorded an error.
///
/// Keeps the errors; only marks the state as handled.
#[derive(Debug, Default)]
pub struct ErrorHandler;

impl Node for ErrorHandler {
    fn name(&self) -> &str {
        "ErrorHandler"
    }

    fn execute(&self, mut state: WorkflowState) -> WorkflowState {
        tracing::warn!(
            workflow = %state.workflow_id().unwrap_or_default(),
            errors = ?state.errors,
            "Workflow errors"
        );

        state.current_step = CurrentStep::ErrorHandled;
        state.next_action = NextAction::End;
        state
    }
}

/// Route after profile analysis.
pub fn route_after_profile_analysis(state: &WorkflowState) -> Next {
    if state.has_errors() {
        return Next::Node(NodeId::ErrorHandler);
    }

    if state.next_action == NextAction::GenerateMessages {
        return Next::Node(NodeId::Personalization);
    }

    Next::End
}

/// Route after personalization.
pub fn route_after_personalization(state: &WorkflowState) -> Next {
    if state.has_errors() {
        Next::Node(NodeId::ErrorHandler)
    } else {
        Next::End
    }
}

/// Invocation counts of the orchestrator's agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invocations {
    pub profile_analysis: u64,
    pub personalization: u64,
}

/// Runs profiles through analysis and personalization.
///
/// One orchestrator can serve any number of concurrent runs; each run owns
/// its own [`WorkflowState`].
pub struct Orchestrator {
    profile_agent: Arc<StepAgent<ProfileAnalysis>>,
    personalization_agent: Arc<StepAgent<Personalization>>,
    graph: Graph,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Orchestrator with the mock profile source and default configuration.
    pub fn new() -> Self {
        Self::with_source(Box::new(MockProfileSource))
    }

    /// Orchestrator with a custom profile source and default configuration.
    pub fn with_source(source: Box<dyn ProfileSource>) -> Self {
        // Default config and fixed graph are both valid
        Self::from_config(OrchestratorConfig::default(), source)
            .unwrap_or_else(|e| unreachable!("built-in orchestrator is invalid: {e:#}"))
    }

    /// Orchestrator from explicit configuration.
    ///
    /// Fails when the configuration does not validate (see
    /// [`OrchestratorConfig::validate`]), the same as [`parse_yaml`](crate::parse_yaml).
    pub fn from_config(
        config: OrchestratorConfig,
        source: Box<dyn ProfileSource>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let profile_agent = Arc::new(StepAgent::new(ProfileAnalysis::new(source)));
        let personalization_agent = Arc::new(StepAgent::new(Personalization::new(
            config.templates.clone(),
        )));
        let graph = build_graph(profile_agent.clone(), personalization_agent.clone())?;

        Ok(Self {
            profile_agent,
            personalization_agent,
            graph,
            config,
        })
    }

    /// The compiled workflow graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// How often each agent has run (diagnostic only).
    pub fn invocations(&self) -> Invocations {
        Invocations {
            profile_analysis: self.profile_agent.invocations(),
            personalization: self.personalization_agent.invocations(),
        }
    }

    /// Process a profile and return the final state.
    ///
    /// # Arguments
    /// * `user_id` - Requesting user, part of the workflow id
    /// * `profile_url` - Profile to analyze; empty is reported as an error
    /// * `message_type` - Selects the template set
    ///
    /// # Returns
    /// The terminal state. Never fails; problems are reported through
    /// `WorkflowState::errors` and end with `current_step == ErrorHandled`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linked_intelligence::{CurrentStep, MessageType, Orchestrator};
    ///
    /// let orchestrator = Orchestrator::new();
    /// let state = orchestrator.process_profile(
    ///     "user-1",
    ///     "https://linkedin.com/in/test",
    ///     MessageType::ConnectionRequest,
    /// );
    ///
    /// assert_eq!(state.current_step, CurrentStep::PersonalizationComplete);
    /// assert_eq!(state.personalized_messages.map(|m| m.len()), Some(3));
    /// ```
    pub fn process_profile(
        &self,
        user_id: &str,
        profile_url: &str,
        message_type: MessageType,
    ) -> WorkflowState {
        self.run(user_id, profile_url, message_type).state
    }

    /// Process a profile and return the final state with the step trace.
    ///
    /// # Arguments
    /// * `user_id` - Requesting user, part of the workflow id
    /// * `profile_url` - Profile to analyze
    /// * `message_type` - Selects the template set
    ///
    /// # Returns
    /// An [`ExecutionResult`] with the state, visited nodes and timings.
    pub fn run(&self, user_id: &str, profile_url: &str, message_type: MessageType) -> ExecutionResult {
        let state = self.initial_state(user_id, profile_url, message_type);
        executor::execute(&self.graph, state, self.config.max_steps)
    }

    /// Initial state for a run, tagged with a fresh workflow id.
    pub fn initial_state(
        &self,
        user_id: &str,
        profile_url: &str,
        message_type: MessageType,
    ) -> WorkflowState {
        let mut state = WorkflowState::new(user_id, profile_url, message_type);
        state.metadata.insert(
            "workflow_id".to_string(),
            Value::String(workflow_id(user_id)),
        );
        state
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// `workflow_<user>_<random>`; unique per run, even for the same profile.
fn workflow_id(user_id: &str) -> String {
    format!("workflow_{}_{}", user_id, uuid::Uuid::new_v4().simple())
}

fn build_graph(
    profile_agent: Arc<StepAgent<ProfileAnalysis>>,
    personalization_agent: Arc<StepAgent<Personalization>>,
) -> Result<Graph, GraphError> {
    Graph::builder()
        .add_node(NodeId::ProfileAnalysis, profile_agent)
        .add_node(NodeId::Personalization, personalization_agent)
        .add_node(NodeId::ErrorHandler, Arc::new(ErrorHandler))
        .set_entry_point(NodeId::ProfileAnalysis)
        .add_conditional_edges(
            NodeId::ProfileAnalysis,
            route_after_profile_analysis,
            [
                Next::Node(NodeId::Personalization),
                Next::Node(NodeId::ErrorHandler),
                Next::End,
            ],
        )
        .add_conditional_edges(
            NodeId::Personalization,
            route_after_personalization,
            [Next::Node(NodeId::ErrorHandler), Next::End],
        )
        .add_edge(NodeId::ErrorHandler, Next::End)
        .compile()
}
