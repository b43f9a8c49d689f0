//! Step Executor: runs the handler bound to a step identifier and normalizes its result.
//!
//! Handlers are registered once, keyed by `StepId`. An identifier with no handler
//! is not an error: it produces a fixed diagnostic and hands control back to the human.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::message::Message;
use crate::sequencer::registry::{Handoff, StepId};
use crate::sequencer::state::{Payload, PayloadField, SharedState};

/// Partial update produced by one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    pub messages: Vec<Message>,
    /// The step's own opinion about what follows; `None` means no opinion.
    pub next: Option<Handoff>,
    pub payload: Payload,
}

/// One unit of pipeline work or one persona's turn.
///
/// External collaborators a step calls must degrade to a local fallback on failure;
/// returning `Err` is reserved for conditions that should end the session.
#[async_trait]
pub trait Step: Send + Sync {
    fn id(&self) -> StepId;

    /// Payload fields this step is allowed to write.
    fn owns(&self) -> &'static [PayloadField] {
        &[]
    }

    async fn run(&self, state: &SharedState) -> Result<StepOutput, AppError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Completed(StepOutput),
    Failed { step: StepId, reason: String },
}

pub struct StepExecutor {
    handlers: HashMap<StepId, Arc<dyn Step>>,
    step_timeout: Duration,
}

impl StepExecutor {
    pub fn new(step_timeout: Duration) -> Self {
        Self {
            handlers: HashMap::new(),
            step_timeout,
        }
    }

    /// Binds a handler to its identifier. A second handler for the same id replaces the first.
    pub fn register(mut self, step: Arc<dyn Step>) -> Self {
        self.handlers.insert(step.id(), step);
        self
    }

    #[cfg(test)]
    pub fn knows(&self, id: StepId) -> bool {
        self.handlers.contains_key(&id)
    }

    pub async fn execute(&self, id: StepId, state: &SharedState) -> StepResult {
        let Some(step) = self.handlers.get(&id) else {
            warn!(step = %id, "No handler registered for step");
            return StepResult::Completed(unrecognized(id));
        };

        debug!(step = %id, stage_index = state.stage_index, "Executing step");

        let mut output = match tokio::time::timeout(self.step_timeout, step.run(state)).await {
            Err(_) => {
                return StepResult::Failed {
                    step: id,
                    reason: format!(
                        "Step '{id}' timed out after {}s",
                        self.step_timeout.as_secs()
                    ),
                }
            }
            Ok(Err(e)) => {
                return StepResult::Failed {
                    step: id,
                    reason: e.diagnostic(),
                }
            }
            Ok(Ok(output)) => output,
        };

        let dropped = output.payload.retain_owned(step.owns());
        if !dropped.is_empty() {
            warn!(step = %id, ?dropped, "Step wrote payload fields it does not own; discarded");
        }

        StepResult::Completed(output)
    }
}

fn unrecognized(id: StepId) -> StepOutput {
    StepOutput {
        messages: vec![Message::assistant(format!("(Unrecognized step: {id})"))],
        next: Some(Handoff::Human),
        payload: Payload::default(),
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted steps for sequencer tests.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Emits fixed messages and a fixed hint; counts invocations.
    pub struct ScriptedStep {
        pub id: StepId,
        pub messages: Vec<&'static str>,
        pub next: Option<Handoff>,
        pub calls: AtomicUsize,
    }

    impl ScriptedStep {
        pub fn new(id: StepId, messages: Vec<&'static str>, next: Option<Handoff>) -> Arc<Self> {
            Arc::new(Self {
                id,
                messages,
                next,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Step for ScriptedStep {
        fn id(&self) -> StepId {
            self.id
        }

        async fn run(&self, _state: &SharedState) -> Result<StepOutput, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StepOutput {
                messages: self.messages.iter().map(|m| Message::assistant(*m)).collect(),
                next: self.next,
                payload: Payload::default(),
            })
        }
    }

    /// Fails every time.
    pub struct BrokenStep(pub StepId);

    #[async_trait]
    impl Step for BrokenStep {
        fn id(&self) -> StepId {
            self.0
        }

        async fn run(&self, _state: &SharedState) -> Result<StepOutput, AppError> {
            Err(AppError::Step("collaborator exploded".to_string()))
        }
    }
}
