use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::debate::personas::persona;
use crate::debate::prompts::{COORDINATOR_PROMPT_TEMPLATE, COORDINATOR_SYSTEM_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::prompts::IDENTIFIER_ONLY_INSTRUCTION;
use crate::llm_client::{transcript, CompletionBackend, LlmError};
use crate::models::message::Message;
use crate::sequencer::policy::Coordinator;
use crate::sequencer::registry::StepId;

/// Asks the language model who should speak next.
/// The raw reply is returned lowercased; `CoordinatorPolicy` validates it.
pub struct LlmCoordinator {
    backend: Option<Arc<dyn CompletionBackend>>,
    timeout: Duration,
}

impl LlmCoordinator {
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }
}

fn participant_lines(candidates: &[StepId]) -> String {
    candidates
        .iter()
        .map(|id| match persona(*id) {
            Some(p) => format!("- {id}: {}, {}", p.name, p.stance),
            None => format!("- {id}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Coordinator for LlmCoordinator {
    async fn choose_next(
        &self,
        candidates: &[StepId],
        message_log: &[Message],
    ) -> Result<String, AppError> {
        let backend = self.backend.as_ref().ok_or(LlmError::NotConfigured)?;

        let system = format!(
            "{}\n\n{}",
            COORDINATOR_SYSTEM_TEMPLATE.replace("{participants}", &participant_lines(candidates)),
            IDENTIFIER_ONLY_INSTRUCTION
        );
        let prompt = COORDINATOR_PROMPT_TEMPLATE.replace("{conversation}", &transcript(message_log));

        let reply = tokio::time::timeout(self.timeout, backend.complete(&system, &prompt))
            .await
            .map_err(|_| AppError::Step("coordinator timed out".to_string()))??;

        let choice = reply.trim().to_lowercase();
        debug!(%choice, "Coordinator replied");
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::CannedBackend;

    #[test]
    fn test_participant_lines_describe_each_candidate() {
        let lines = participant_lines(&[StepId::VictimMother, StepId::Activist]);
        assert_eq!(
            lines,
            "- victim_mother: Sarah Chen, mother of a murder victim, supports capital punishment\n\
             - activist: Maya Singh, human rights activist, opposes death penalty"
        );
    }

    #[tokio::test]
    async fn test_reply_is_trimmed_and_lowercased() {
        let backend = Arc::new(CannedBackend::new("  Police_Officer \n"));
        let coordinator = LlmCoordinator::new(Some(backend.clone()), Duration::from_secs(5));

        let choice = coordinator
            .choose_next(&[StepId::PoliceOfficer], &[Message::user("Does it deter?")])
            .await
            .unwrap();

        assert_eq!(choice, "police_officer");
        assert!(backend.prompts.lock().unwrap()[0].contains("Does it deter?"));
    }

    #[tokio::test]
    async fn test_missing_backend_is_an_error() {
        let coordinator = LlmCoordinator::new(None, Duration::from_secs(5));
        let err = coordinator.choose_next(&[StepId::Activist], &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::NotConfigured)));
    }
}
