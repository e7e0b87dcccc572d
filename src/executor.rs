//! Workflow execution engine.

use crate::graph::{Graph, Next, NodeId, Transition};
use crate::state::WorkflowState;

/// Result of workflow execution.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Final workflow state
    pub state: WorkflowState,

    /// Every node visit, in order
    pub steps: Vec<StepRecord>,

    /// Total execution time in milliseconds
    pub total_ms: f64,
}

/// A single node visit.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Visit index (0-based)
    pub index: usize,

    /// Node that was executed
    pub node: NodeId,

    /// Where the graph routed afterwards
    pub next: Next,

    /// Execution time in milliseconds
    pub duration_ms: f64,
}

impl ExecutionResult {
    /// Nodes visited, in order.
    pub fn path(&self) -> Vec<NodeId> {
        self.steps.iter().map(|s| s.node).collect()
    }
}

/// Execute a graph against a state.
///
/// Starts at the graph's entry node and follows the transition table until
/// it reaches [`Next::End`].
///
/// # Arguments
/// * `graph` - The compiled workflow graph
/// * `state` - Initial state for this run
/// * `max_steps` - Node visits allowed before the run is halted
///
/// # Returns
/// The final state with the step trace. Never fails: a run that exceeds
/// `max_steps`, or whose router answers an undeclared target, has an error
/// recorded on its state and is handed to the graph's
/// [`NodeId::ErrorHandler`] node, when one is registered and has not run yet.
pub fn execute(graph: &Graph, state: WorkflowState, max_steps: usize) -> ExecutionResult {
    let workflow = state.workflow_id().unwrap_or_default().to_string();
    tracing::info!(workflow = %workflow, profile_url = %state.profile_url, "Starting workflow");

    let start = std::time::Instant::now();
    let mut state = state;
    let mut steps = Vec::new();
    let mut current = Next::Node(graph.entry());
    let mut halted = false;

    while let Next::Node(id) = current {
        if steps.len() >= max_steps {
            tracing::warn!(workflow = %workflow, max_steps, "Step limit reached");
            state.record_error(format!("orchestrator: exceeded {max_steps} steps"));
            halted = true;
            break;
        }

        let Some(node) = graph.node(id) else {
            state.record_error(format!("orchestrator: no node registered for '{id}'"));
            halted = true;
            break;
        };

        let step_start = std::time::Instant::now();
        tracing::debug!(step = steps.len(), node = %id, agent = %node.name(), "Executing step");

        state = node.execute(state);

        let next = match graph.transition(id, &state) {
            Transition::To(next) => next,
            Transition::Undeclared(next) => {
                state.record_error(format!("orchestrator: undeclared route from '{id}' to '{next}'"));
                halted = true;
                Next::End
            }
        };

        steps.push(record(steps.len(), id, next, step_start));
        current = next;
    }

    // Executor-recorded errors still end at the error handler
    if halted && !steps.iter().any(|s| s.node == NodeId::ErrorHandler) {
        if let Some(handler) = graph.node(NodeId::ErrorHandler) {
            let step_start = std::time::Instant::now();
            tracing::debug!(step = steps.len(), node = %NodeId::ErrorHandler, "Executing step");

            state = handler.execute(state);
            steps.push(record(steps.len(), NodeId::ErrorHandler, Next::End, step_start));
        }
    }

    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        workflow = %workflow,
        current_step = %state.current_step,
        errors = state.errors.len(),
        total_ms,
        "Workflow completed"
    );

    ExecutionResult {
        state,
        steps,
        total_ms,
    }
}

fn record(index: usize, node: NodeId, next: Next, started: std::time::Instant) -> StepRecord {
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(step = index, node = %node, next = %next, duration_ms, "Step completed");

    StepRecord {
        index,
        node,
        next,
        duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::state::{CurrentStep, MessageType};
    use std::sync::Arc;

    struct Mark(CurrentStep);

    impl Node for Mark {
        fn name(&self) -> &str {
            self.0.as_str()
        }

        fn execute(&self, mut state: WorkflowState) -> WorkflowState {
            state.current_step = self.0;
            state
        }
    }

    struct Fail;

    impl Node for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        fn execute(&self, mut state: WorkflowState) -> WorkflowState {
            state.record_error("fail: boom");
            state
        }
    }

    fn state() -> WorkflowState {
        WorkflowState::new("u1", "https://linkedin.com/in/test", MessageType::default())
    }

    fn always_error_handler(_: &WorkflowState) -> Next {
        Next::Node(NodeId::ErrorHandler)
    }

    #[test]
    fn test_linear_run() {
        let graph = Graph::builder()
            .add_node(
                NodeId::ProfileAnalysis,
                Arc::new(Mark(CurrentStep::ProfileAnalysisComplete)),
            )
            .add_node(
                NodeId::Personalization,
                Arc::new(Mark(CurrentStep::PersonalizationComplete)),
            )
            .set_entry_point(NodeId::ProfileAnalysis)
            .add_edge(NodeId::ProfileAnalysis, Next::Node(NodeId::Personalization))
            .add_edge(NodeId::Personalization, Next::End)
            .compile()
            .unwrap();

        let result = execute(&graph, state(), 10);

        assert_eq!(
            result.path(),
            vec![NodeId::ProfileAnalysis, NodeId::Personalization]
        );
        assert_eq!(result.steps[1].next, Next::End);
        assert_eq!(result.state.current_step, CurrentStep::PersonalizationComplete);
        assert!(result.state.errors.is_empty());
    }

    #[test]
    fn test_step_limit() {
        let graph = Graph::builder()
            .add_node(NodeId::ErrorHandler, Arc::new(Fail))
            .set_entry_point(NodeId::ErrorHandler)
            .add_edge(NodeId::ErrorHandler, Next::Node(NodeId::ErrorHandler))
            .compile()
            .unwrap();

        let result = execute(&graph, state(), 3);

        assert_eq!(result.steps.len(), 3);
        assert_eq!(
            result.state.errors.last().map(String::as_str),
            Some("orchestrator: exceeded 3 steps")
        );
    }

    #[test]
    fn test_undeclared_route_ends_at_error_handler() {
        let graph = Graph::builder()
            .add_node(NodeId::ProfileAnalysis, Arc::new(Fail))
            .add_node(NodeId::ErrorHandler, Arc::new(Mark(CurrentStep::ErrorHandled)))
            .set_entry_point(NodeId::ProfileAnalysis)
            .add_conditional_edges(NodeId::ProfileAnalysis, always_error_handler, [Next::End])
            .add_edge(NodeId::ErrorHandler, Next::End)
            .compile()
            .unwrap();

        let result = execute(&graph, state(), 10);

        assert_eq!(
            result.path(),
            vec![NodeId::ProfileAnalysis, NodeId::ErrorHandler]
        );
        assert_eq!(
            result.state.errors,
            vec![
                "fail: boom",
                "orchestrator: undeclared route from 'profile_analysis' to 'error_handler'"
            ]
        );
        assert_eq!(result.state.current_step, CurrentStep::ErrorHandled);
    }

    #[test]
    fn test_step_limit_ends_at_error_handler() {
        let graph = Graph::builder()
            .add_node(
                NodeId::ProfileAnalysis,
                Arc::new(Mark(CurrentStep::ProfileAnalysisComplete)),
            )
            .add_node(NodeId::ErrorHandler, Arc::new(Mark(CurrentStep::ErrorHandled)))
            .set_entry_point(NodeId::ProfileAnalysis)
            .add_edge(NodeId::ProfileAnalysis, Next::Node(NodeId::ProfileAnalysis))
            .add_edge(NodeId::ErrorHandler, Next::End)
            .compile()
            .unwrap();

        for max_steps in [0, 1, 3] {
            let result = execute(&graph, state(), max_steps);

            assert_eq!(
                result.state.errors,
                vec![format!("orchestrator: exceeded {max_steps} steps")]
            );
            assert!(
                result.state.errors.is_empty()
                    || result.state.current_step == CurrentStep::ErrorHandled
            );
            assert_eq!(result.steps.len(), max_steps + 1);
            assert_eq!(result.path().last(), Some(&NodeId::ErrorHandler));
            assert_eq!(result.steps[max_steps].next, Next::End);
        }
    }
}
