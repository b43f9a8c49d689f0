//! Debate variant: four personas argue capital punishment, a coordinator picks
//! each next speaker, and the human moderates between volleys.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::AppError;
use crate::llm_client::CompletionBackend;
use crate::sequencer::executor::StepExecutor;
use crate::sequencer::registry::StepRegistry;
use crate::tools::ReferenceLookup;

pub mod coordinator;
pub mod participant;
pub mod personas;
pub mod prompts;

use participant::PersonaStep;
use personas::PERSONAS;

/// Subject the `news` tool looks up.
pub const NEWS_TOPIC: &str = "Capital punishment in Singapore";

/// Every persona is a candidate on every turn.
pub fn registry() -> StepRegistry {
    StepRegistry::new(PERSONAS.iter().map(|p| p.id).collect())
}

pub fn executor(
    step_timeout: Duration,
    backend: Option<Arc<dyn CompletionBackend>>,
    lookup: Arc<dyn ReferenceLookup>,
) -> Result<StepExecutor, AppError> {
    // Half the step for the model reply, a quarter for a tool call.
    let reply_timeout = step_timeout / 2;
    PERSONAS.iter().try_fold(StepExecutor::new(step_timeout), |exec, persona| {
        let step = PersonaStep::new(persona, backend.clone(), lookup.clone(), reply_timeout)?;
        Ok(exec.register(Arc::new(step)))
    })
}
