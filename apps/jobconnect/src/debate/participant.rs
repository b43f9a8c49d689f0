//! Persona step: one ReAct-style turn in the debate.
//!
//! The model answers in `THOUGHTS / ACTION: [tool] / RESPONSE:` form. A named tool
//! is executed and its observation logged; only the RESPONSE line is spoken.
//! Every failure degrades to an in-character apology, never to a step error.
//! The model call and the tool call each run under a deadline shorter than the step's.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::debate::personas::{Persona, Tool};
use crate::debate::prompts::{PERSONA_PROMPT_TEMPLATE, PERSONA_SYSTEM_TEMPLATE};
use crate::debate::NEWS_TOPIC;
use crate::errors::AppError;
use crate::llm_client::{transcript, CompletionBackend, LlmError};
use crate::models::message::Message;
use crate::sequencer::executor::{Step, StepOutput};
use crate::sequencer::registry::StepId;
use crate::sequencer::state::SharedState;
use crate::tools::clock::singapore_time;
use crate::tools::ReferenceLookup;

pub struct PersonaStep {
    persona: &'static Persona,
    backend: Option<Arc<dyn CompletionBackend>>,
    lookup: Arc<dyn ReferenceLookup>,
    reply_timeout: Duration,
    action_re: Regex,
    response_re: Regex,
}

/// The parts of a ReAct reply this step acts on.
#[derive(Debug, Default, PartialEq)]
pub struct ReactReply {
    pub action: Option<String>,
    pub response: Option<String>,
}

impl PersonaStep {
    pub fn new(
        persona: &'static Persona,
        backend: Option<Arc<dyn CompletionBackend>>,
        lookup: Arc<dyn ReferenceLookup>,
        reply_timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            persona,
            backend,
            lookup,
            reply_timeout,
            action_re: Regex::new(r"ACTION: \[(.*?)\]").map_err(anyhow::Error::from)?,
            response_re: Regex::new(r"RESPONSE: ?([^\n]*)").map_err(anyhow::Error::from)?,
        })
    }

    pub fn parse_reply(&self, reply: &str) -> ReactReply {
        let group = |re: &Regex| {
            re.captures(reply)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };
        ReactReply {
            action: group(&self.action_re),
            response: group(&self.response_re),
        }
    }

    pub async fn execute_tool(&self, name: &str) -> String {
        match Tool::parse(name) {
            Some(Tool::Time) => singapore_time(),
            Some(Tool::News) => {
                let lookup = tokio::time::timeout(self.tool_timeout(), self.lookup.summary(NEWS_TOPIC));
                match lookup.await {
                    Ok(Ok(Some(text))) => text,
                    Ok(Ok(None)) => format!("No news found for '{NEWS_TOPIC}'."),
                    Ok(Err(e)) => {
                        warn!(error = %e, "News lookup failed");
                        "News is unavailable right now.".to_string()
                    }
                    Err(_) => {
                        warn!("News lookup timed out");
                        "News is unavailable right now.".to_string()
                    }
                }
            }
            None => format!("Unknown tool: {}", name.trim().to_lowercase()),
        }
    }

    /// Tool calls share what is left of the step after the model has replied.
    fn tool_timeout(&self) -> Duration {
        self.reply_timeout / 2
    }

    async fn ask(&self, prompt: &str) -> Result<String, AppError> {
        let backend = self.backend.as_ref().ok_or(LlmError::NotConfigured)?;
        let reply = tokio::time::timeout(self.reply_timeout, backend.complete(&self.system_prompt(), prompt))
            .await
            .map_err(|_| AppError::Step(format!("{} took too long to reply", self.persona.name)))??;
        Ok(reply)
    }

    fn system_prompt(&self) -> String {
        let tools: String = self
            .persona
            .tools
            .iter()
            .map(|t| format!("\n\n{}:\n{}", t.as_str(), t.description()))
            .collect();

        PERSONA_SYSTEM_TEMPLATE
            .replace("{name}", self.persona.name)
            .replace("{age}", &self.persona.age.to_string())
            .replace("{backstory}", self.persona.backstory)
            .replace("{personality}", self.persona.personality)
            .replace("{speech_style}", self.persona.speech_style)
            .replace("{tools}", &tools)
    }

    fn say(&self, words: &str) -> Message {
        Message::assistant(format!("{}: {}", self.persona.name, words))
    }
}

#[async_trait]
impl Step for PersonaStep {
    fn id(&self) -> StepId {
        self.persona.id
    }

    async fn run(&self, state: &SharedState) -> Result<StepOutput, AppError> {
        debug!(persona = self.persona.name, "Persona considering");

        let prompt = PERSONA_PROMPT_TEMPLATE.replace("{conversation}", &transcript(&state.message_log));

        let message = match self.ask(&prompt).await {
            Ok(reply) => {
                let parsed = self.parse_reply(&reply);
                if let Some(action) = &parsed.action {
                    let observation = self.execute_tool(action).await;
                    debug!(persona = self.persona.name, tool = %action, %observation, "Tool result");
                }
                match parsed.response {
                    Some(response) => self.say(&response),
                    None => self.say("I apologize, but I need to collect my thoughts before continuing."),
                }
            }
            Err(e) => {
                warn!(persona = self.persona.name, error = %e, "Persona could not speak");
                self.say("I apologize, but I need a moment to gather my thoughts.")
            }
        };

        Ok(StepOutput {
            messages: vec![message],
            ..StepOutput::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::personas::persona;
    use crate::llm_client::testing::{CannedBackend, FailingBackend};
    use crate::sequencer::executor::{StepExecutor, StepResult};
    use crate::tools::wikipedia::testing::{OfflineLookup, StaticLookup};

    fn step(backend: Option<Arc<dyn CompletionBackend>>, lookup: Arc<dyn ReferenceLookup>) -> PersonaStep {
        PersonaStep::new(persona(StepId::Activist).unwrap(), backend, lookup, Duration::from_secs(10)).unwrap()
    }

    fn offline(backend: Option<Arc<dyn CompletionBackend>>) -> PersonaStep {
        step(backend, Arc::new(OfflineLookup))
    }

    #[test]
    fn test_parse_reply_extracts_action_and_single_line_response() {
        let parsed = offline(None).parse_reply(
            "THOUGHTS: numbers matter\nACTION: [news]\nRESPONSE: Executions do not deter crime.\nExtra line",
        );
        assert_eq!(
            parsed,
            ReactReply {
                action: Some("news".to_string()),
                response: Some("Executions do not deter crime.".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_action_brackets_are_no_action() {
        let parsed = offline(None).parse_reply("ACTION: []\nRESPONSE: Fine.");
        assert_eq!(parsed.action, None);
    }

    #[tokio::test]
    async fn test_response_is_spoken_in_persona_name() {
        let backend = Arc::new(CannedBackend::new("THOUGHTS: x\nRESPONSE: Every life has worth."));
        let mut state = SharedState::new();
        state.message_log.push(Message::user("Is the death penalty just?"));

        let output = offline(Some(backend.clone())).run(&state).await.unwrap();

        assert_eq!(output.messages, vec![Message::assistant("Maya Singh: Every life has worth.")]);
        assert_eq!(output.next, None);
        assert!(backend.prompts.lock().unwrap()[0].contains("Is the death penalty just?"));
    }

    #[tokio::test]
    async fn test_missing_response_line_apologizes() {
        let backend = Arc::new(CannedBackend::new("THOUGHTS: hmm"));
        let output = offline(Some(backend)).run(&SharedState::new()).await.unwrap();
        assert_eq!(
            output.messages[0].content,
            "Maya Singh: I apologize, but I need to collect my thoughts before continuing."
        );
    }

    #[tokio::test]
    async fn test_llm_failure_apologizes_instead_of_failing() {
        for backend in [None, Some(Arc::new(FailingBackend) as Arc<dyn CompletionBackend>)] {
            let output = offline(backend).run(&SharedState::new()).await.unwrap();
            assert_eq!(
                output.messages[0].content,
                "Maya Singh: I apologize, but I need a moment to gather my thoughts."
            );
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl CompletionBackend for SlowBackend {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(45)).await;
            Ok("RESPONSE: Too late.".to_string())
        }
    }

    struct SlowLookup;

    #[async_trait]
    impl ReferenceLookup for SlowLookup {
        async fn summary(&self, _name: &str) -> Result<Option<String>, AppError> {
            tokio::time::sleep(Duration::from_secs(45)).await;
            Ok(Some("Too late.".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_apologizes_within_step_deadline() {
        let step_timeout = Duration::from_secs(30);
        let exec = StepExecutor::new(step_timeout).register(Arc::new(
            PersonaStep::new(
                persona(StepId::Activist).unwrap(),
                Some(Arc::new(SlowBackend)),
                Arc::new(OfflineLookup),
                step_timeout / 2,
            )
            .unwrap(),
        ));

        let output = match exec.execute(StepId::Activist, &SharedState::new()).await {
            StepResult::Completed(output) => output,
            other => panic!("slow model must not fail the step, got {other:?}"),
        };
        assert_eq!(
            output.messages[0].content,
            "Maya Singh: I apologize, but I need a moment to gather my thoughts."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_news_lookup_degrades() {
        let s = step(None, Arc::new(SlowLookup));
        assert_eq!(s.execute_tool("news").await, "News is unavailable right now.");
    }

    #[tokio::test]
    async fn test_news_tool_fetches_reference_summary() {
        let lookup = Arc::new(StaticLookup::new(Some("Singapore retains the death penalty.")));
        let s = step(None, lookup.clone());

        assert_eq!(s.execute_tool("News").await, "Singapore retains the death penalty.");
        assert_eq!(*lookup.asked.lock().unwrap(), vec![NEWS_TOPIC]);
    }

    #[tokio::test]
    async fn test_news_tool_degrades_when_lookup_fails() {
        assert_eq!(offline(None).execute_tool("news").await, "News is unavailable right now.");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_named() {
        assert_eq!(offline(None).execute_tool(" Weather ").await, "Unknown tool: weather");
    }

    #[tokio::test]
    async fn test_time_tool_reports_clock_reading() {
        let shape = Regex::new(r"^\d{2}:\d{2} (AM|PM), \d{2} [A-Z][a-z]+ \d{4}$").unwrap();
        let reading = offline(None).execute_tool("time").await;
        assert!(shape.is_match(&reading), "unexpected time format: {reading}");
    }

    #[test]
    fn test_system_prompt_lists_persona_and_tools() {
        let prompt = offline(None).system_prompt();
        assert!(prompt.starts_with("You are Maya Singh, 35 years old."));
        assert!(prompt.contains("\n\nnews:\nReturns latest news about crime and justice in Singapore"));
        assert!(!prompt.contains('{'));
    }
}
