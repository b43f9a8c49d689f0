use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, Mode};
use crate::debate;
use crate::debate::coordinator::LlmCoordinator;
use crate::llm_client::{self, CompletionBackend, LlmClient};
use crate::pipeline;
use crate::pipeline::job_search::{JobSource, MockJobBoard};
use crate::pipeline::scenarios::{self, Scenario};
use crate::sequencer::policy::{CoordinatorPolicy, NextStepPolicy, PositionalPolicy};
use crate::sequencer::state::SharedState;
use crate::sequencer::{HistoryPolicy, Sequencer, SequencerConfig};
use crate::summary::{LlmSummarizer, SummaryProfile};
use crate::tools::{ReferenceLookup, WikipediaClient};

/// Collaborators built once at startup and shared by every step.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no API key is configured; every LLM-backed collaborator then
    /// uses its deterministic fallback.
    pub llm: Option<Arc<dyn CompletionBackend>>,
    pub lookup: Arc<dyn ReferenceLookup>,
    pub jobs: Arc<dyn JobSource>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let llm: Option<Arc<dyn CompletionBackend>> = match &config.anthropic_api_key {
            Some(key) => {
                let client = LlmClient::new(key.clone(), config.llm_timeout)
                    .context("Failed to build LLM client")?;
                info!("LLM client initialized (model: {})", llm_client::MODEL);
                Some(Arc::new(client))
            }
            None => {
                info!("ANTHROPIC_API_KEY not set; using deterministic fallbacks");
                None
            }
        };

        let lookup = WikipediaClient::new(config.wikipedia_api_url.clone(), config.lookup_timeout)
            .context("Failed to build reference lookup client")?;

        let jobs = match &config.job_listings_path {
            Some(path) => MockJobBoard::from_json_file(path)
                .with_context(|| format!("Failed to load job listings from {path}"))?,
            None => MockJobBoard::singapore(),
        };

        Ok(Self {
            config,
            llm,
            lookup: Arc::new(lookup),
            jobs: Arc::new(jobs),
        })
    }

    /// Wires the policy, executor and summary profile that match the configured mode.
    pub fn build_sequencer(&self) -> Result<Sequencer> {
        let config = &self.config;

        let (policy, executor, profile) = match config.mode {
            Mode::Pipeline => (
                Box::new(PositionalPolicy::new(pipeline::registry())) as Box<dyn NextStepPolicy>,
                pipeline::executor(config.step_timeout, self.jobs.clone(), self.lookup.clone())?,
                SummaryProfile::JobSearch,
            ),
            Mode::Debate => (
                Box::new(CoordinatorPolicy::new(
                    debate::registry(),
                    Arc::new(LlmCoordinator::new(self.llm.clone(), config.llm_timeout)),
                    config.demo_seed,
                )) as Box<dyn NextStepPolicy>,
                debate::executor(config.step_timeout, self.llm.clone(), self.lookup.clone())?,
                SummaryProfile::Debate,
            ),
        };

        let summarizer = LlmSummarizer::new(self.llm.clone(), profile, config.llm_timeout);

        Ok(Sequencer::new(
            policy,
            executor,
            Arc::new(summarizer),
            SequencerConfig {
                turn_budget: config.turn_budget,
                history: if config.carry_history {
                    HistoryPolicy::Carry
                } else {
                    HistoryPolicy::ClearAfterSummary
                },
            },
        ))
    }

    /// Fresh session state. Pipeline mode seeds it with a demo scenario.
    pub fn initial_state(&self) -> (SharedState, Option<Scenario>) {
        let mut state = SharedState::new();
        if self.config.mode != Mode::Pipeline {
            return (state, None);
        }

        let scenario = scenarios::pick(self.config.demo_seed);
        state.inputs.resume_text = Some(scenario.resume_text.to_string());
        state.inputs.scenario_query = Some(scenario.job_query.to_string());
        (state, Some(scenario))
    }
}
