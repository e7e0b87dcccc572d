//! Step agents: one pipeline stage wrapped with uniform error isolation.

use crate::graph::Node;
use crate::state::WorkflowState;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stage-specific logic run by a [`StepAgent`].
pub trait Stage: Send + Sync {
    /// Name prefixed to errors raised by this stage.
    fn name(&self) -> &str;

    /// Run the stage.
    ///
    /// Input validation failures are recorded on the state and return
    /// `Ok`. Any `Err` is contained by the agent.
    fn run_stage(&self, state: &mut WorkflowState) -> Result<()>;
}

/// Runs a [`Stage`] and turns its failures into state errors.
#[derive(Debug)]
pub struct StepAgent<S> {
    stage: S,
    invocations: AtomicU64,
}

impl<S: Stage> StepAgent<S> {
    /// Wrap a stage.
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            invocations: AtomicU64::new(0),
        }
    }

    /// The wrapped stage.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// How many times this agent has been executed (diagnostic only).
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Execute the stage. Never fails: a stage error is appended to
    /// `state.errors` as `"<name>: <message>"`.
    pub fn execute(&self, mut state: WorkflowState) -> WorkflowState {
        let run = self.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        let name = self.stage.name();

        tracing::debug!(agent = %name, run, "Executing agent");

        if let Err(e) = self.stage.run_stage(&mut state) {
            tracing::warn!(agent = %name, error = %e, "Agent failed");
            state.record_error(format!("{name}: {e:#}"));
        }

        state
    }
}

impl<S: Stage> Node for StepAgent<S> {
    fn name(&self) -> &str {
        self.stage.name()
    }

    fn execute(&self, state: WorkflowState) -> WorkflowState {
        StepAgent::execute(self, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CurrentStep, MessageType, NextAction};

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &str {
            "FailingAgent"
        }

        fn run_stage(&self, state: &mut WorkflowState) -> Result<()> {
            state.engagement_score = Some(0.9);
            anyhow::bail!("upstream timed out")
        }
    }

    struct Marking;

    impl Stage for Marking {
        fn name(&self) -> &str {
            "MarkingAgent"
        }

        fn run_stage(&self, state: &mut WorkflowState) -> Result<()> {
            state.current_step = CurrentStep::ProfileAnalysisComplete;
            state.next_action = NextAction::GenerateMessages;
            Ok(())
        }
    }

    fn state() -> WorkflowState {
        WorkflowState::new("u1", "https://linkedin.com/in/test", MessageType::default())
    }

    #[test]
    fn test_error_is_contained() {
        let agent = StepAgent::new(Failing);
        let result = agent.execute(state());

        assert_eq!(result.errors, vec!["FailingAgent: upstream timed out"]);
        assert_eq!(result.current_step, CurrentStep::Initialized);
    }

    #[test]
    fn test_success_leaves_errors_empty() {
        let agent = StepAgent::new(Marking);
        let result = agent.execute(state());

        assert!(result.errors.is_empty());
        assert_eq!(result.current_step, CurrentStep::ProfileAnalysisComplete);
        assert_eq!(result.next_action, NextAction::GenerateMessages);
    }

    #[test]
    fn test_errors_append_to_existing() {
        let agent = StepAgent::new(Failing);
        let mut st = state();
        st.record_error("earlier");

        let result = agent.execute(st);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0], "earlier");
    }

    #[test]
    fn test_invocation_counter() {
        let agent = StepAgent::new(Marking);
        assert_eq!(agent.invocations(), 0);

        agent.execute(state());
        agent.execute(state());

        assert_eq!(agent.invocations(), 2);
        assert_eq!(Node::name(&agent), "MarkingAgent");
    }
}
