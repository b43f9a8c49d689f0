//! Summary collaborator: the closing report read when a volley or the session ends.
//!
//! `summarize` is infallible by signature: every failure path (no backend, LLM error,
//! timeout) degrades to a deterministic template built from the message count.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;
use crate::llm_client::{transcript, CompletionBackend, LlmError};
use crate::sequencer::state::SharedState;

pub mod prompts;

use prompts::{DEBATE_SUMMARY_SYSTEM, JOB_SEARCH_SUMMARY_SYSTEM, SUMMARY_PROMPT_TEMPLATE};

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, state: &SharedState) -> String;
}

/// Which conversation the report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryProfile {
    JobSearch,
    Debate,
}

impl SummaryProfile {
    pub fn header(self) -> &'static str {
        match self {
            SummaryProfile::JobSearch => "=== KOPITIAM CONVERSATION SUMMARY ===",
            SummaryProfile::Debate => "=== DISCUSSION SUMMARY ===",
        }
    }

    fn system_prompt(self) -> &'static str {
        match self {
            SummaryProfile::JobSearch => JOB_SEARCH_SUMMARY_SYSTEM,
            SummaryProfile::Debate => DEBATE_SUMMARY_SYSTEM,
        }
    }
}

pub struct LlmSummarizer {
    backend: Option<Arc<dyn CompletionBackend>>,
    profile: SummaryProfile,
    timeout: Duration,
}

impl LlmSummarizer {
    /// `backend = None` means every summary uses the deterministic template.
    pub fn new(
        backend: Option<Arc<dyn CompletionBackend>>,
        profile: SummaryProfile,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            profile,
            timeout,
        }
    }

    async fn narrate(&self, conversation: &str) -> Result<String, AppError> {
        let backend = self.backend.as_ref().ok_or(LlmError::NotConfigured)?;
        let system = format!("{}\n\n{}", self.profile.system_prompt(), PLAIN_TEXT_INSTRUCTION);
        let prompt = SUMMARY_PROMPT_TEMPLATE.replace("{transcript}", conversation);

        let text = tokio::time::timeout(self.timeout, backend.complete(&system, &prompt))
            .await
            .map_err(|_| AppError::Step("summary timed out".to_string()))??;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, state: &SharedState) -> String {
        if state.message_log.is_empty() {
            return "No conversation to summarize.".to_string();
        }

        let conversation = transcript(&state.message_log);
        if conversation.trim().is_empty() {
            return "No conversation content to summarize.".to_string();
        }

        match self.narrate(&conversation).await {
            Ok(text) => format!(
                "{}\n\n{}{}",
                self.profile.header(),
                text,
                outcome_lines(state)
            ),
            Err(e) => {
                warn!("Summary collaborator unavailable, using template: {e}");
                fallback_summary(self.profile, state)
            }
        }
    }
}

/// Deterministic report used whenever the language model cannot be reached.
pub fn fallback_summary(profile: SummaryProfile, state: &SharedState) -> String {
    format!(
        "{}\n\nTotal messages: {}\n\nUnable to generate detailed summary at this time.",
        profile.header(),
        state.message_log.len()
    )
}

/// Top match and sample pitch, when the pipeline got that far.
fn outcome_lines(state: &SharedState) -> String {
    let mut lines = String::new();
    if let Some(top) = state.payload.scored_jobs.as_ref().and_then(|s| s.first()) {
        lines.push_str(&format!(
            "\n\nTop match: {} @ {} ({}/100)",
            top.job.title, top.job.company, top.score
        ));
    }
    if let Some(pitch) = state.payload.final_pitch.as_deref() {
        lines.push_str(&format!("\n\n=== SAMPLE PITCH ===\n{pitch}"));
    }
    lines
}
