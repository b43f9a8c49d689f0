//! Turn-Taking Sequencer: decides, after every human input and every step,
//! whether to run another step, hand control back to the human, or summarize.
//!
//! Flow per human turn:
//!   AwaitingHuman → Dispatching ⇄ Executing → … → Summarizing → AwaitingHuman | Terminated
//!
//! Exactly one step runs per Executing phase, and control always returns to
//! Dispatching for a fresh decision before the next one.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::models::message::Message;
use crate::summary::Summarizer;

pub mod executor;
pub mod policy;
pub mod registry;
pub mod state;

use executor::{StepExecutor, StepResult};
use policy::NextStepPolicy;
use registry::{Handoff, Resolution, StepId};
use state::SharedState;

/// Matched case-insensitively anywhere in the human's latest message.
pub const EXIT_KEYWORD: &str = "exit";

pub fn requests_exit(text: &str) -> bool {
    text.to_lowercase().contains(EXIT_KEYWORD)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHuman,
    Dispatching,
    Executing(StepId),
    Summarizing,
    Terminated,
}

/// What happens to the message log once a summary has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPolicy {
    Carry,
    ClearAfterSummary,
}

#[derive(Debug, Clone, Copy)]
pub struct SequencerConfig {
    pub turn_budget: u32,
    pub history: HistoryPolicy,
}

/// Everything that happened between one human input and the next prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    pub executed: Vec<StepId>,
    /// Messages the steps appended, in order.
    pub messages: Vec<Message>,
    pub diagnostics: Vec<String>,
    pub summary: Option<String>,
    pub terminated: bool,
}

pub struct Sequencer {
    policy: Box<dyn NextStepPolicy>,
    executor: StepExecutor,
    summarizer: Arc<dyn Summarizer>,
    config: SequencerConfig,
}

impl Sequencer {
    pub fn new(
        policy: Box<dyn NextStepPolicy>,
        executor: StepExecutor,
        summarizer: Arc<dyn Summarizer>,
        config: SequencerConfig,
    ) -> Self {
        info!(
            policy = policy.name(),
            turn_budget = config.turn_budget,
            "Sequencer ready"
        );
        Self {
            policy,
            executor,
            summarizer,
            config,
        }
    }

    /// AwaitingHuman → Summarizing | Dispatching.
    ///
    /// The human message (and any command notes) is always logged. Only the
    /// Dispatching path restores the budget and rewinds the stage cursor.
    pub fn accept_human_input(
        &self,
        state: &mut SharedState,
        text: &str,
        notes: Vec<Message>,
    ) -> Phase {
        state.message_log.push(Message::user(text));
        state.message_log.extend(notes);

        if requests_exit(text) {
            info!("Exit requested");
            return Phase::Summarizing;
        }

        if state.turns_remaining == 0 {
            state.turns_remaining = self.config.turn_budget;
        }
        state.stage_index = 0;
        state.pending_next_step = None;

        Phase::Dispatching
    }

    /// Dispatching → Summarizing | AwaitingHuman | Executing.
    /// The order of checks is load-bearing: budget exhaustion wins over a human handoff.
    pub async fn dispatch(&mut self, state: &SharedState) -> Phase {
        if state.turns_remaining == 0 {
            debug!("Turn budget exhausted");
            return Phase::Summarizing;
        }

        if state.pending_next_step == Some(Handoff::Human) {
            debug!("Step handed control back to the human");
            return Phase::AwaitingHuman;
        }

        match self.policy.resolve(state).await {
            Resolution::Run(id) => {
                if let Some(Handoff::Step(hinted)) = state.pending_next_step {
                    if hinted != id {
                        debug!(%hinted, resolved = %id, "Step hint overruled by policy");
                    }
                }
                Phase::Executing(id)
            }
            Resolution::Complete => {
                debug!(stage_index = state.stage_index, "Pipeline complete");
                Phase::AwaitingHuman
            }
        }
    }

    /// Executing → Dispatching, or → Summarizing when the step failed.
    pub async fn execute(
        &self,
        step: StepId,
        state: &mut SharedState,
        report: &mut TurnReport,
    ) -> Phase {
        match self.executor.execute(step, state).await {
            StepResult::Completed(output) => {
                report.executed.push(step);
                report.messages.extend(output.messages.iter().cloned());

                state.merge(output.messages, output.payload);
                state.stage_index += 1;
                state.turns_remaining = state.turns_remaining.saturating_sub(1);
                state.pending_next_step = output.next;

                if output.next == Some(Handoff::Human) {
                    state.turns_remaining = 0;
                }

                debug!(
                    %step,
                    stage_index = state.stage_index,
                    turns_remaining = state.turns_remaining,
                    "Step finished"
                );
                Phase::Dispatching
            }
            StepResult::Failed { step, reason } => {
                error!(%step, %reason, "Step failed, ending volley");
                report
                    .diagnostics
                    .push(format!("Step '{step}' failed: {reason}"));
                state.turns_remaining = 0;
                Phase::Summarizing
            }
        }
    }

    /// Summarizing → Terminated (the human asked to exit) | AwaitingHuman.
    pub async fn summarize(&self, state: &mut SharedState) -> (String, Phase) {
        let summary = self.summarizer.summarize(state).await;

        let exit_requested = state
            .latest_human_message()
            .map(|m| requests_exit(&m.content))
            .unwrap_or(false);

        if exit_requested {
            return (summary, Phase::Terminated);
        }

        if self.config.history == HistoryPolicy::ClearAfterSummary {
            state.clear_history();
        }
        (summary, Phase::AwaitingHuman)
    }

    /// Runs one full human turn: from accepting the input until control is back
    /// with the human or the session is over.
    pub async fn run_turn(
        &mut self,
        state: &mut SharedState,
        text: &str,
        notes: Vec<Message>,
    ) -> TurnReport {
        let mut report = TurnReport::default();
        let mut phase = self.accept_human_input(state, text, notes);

        loop {
            debug!(
                ?phase,
                stage_index = state.stage_index,
                turns_remaining = state.turns_remaining,
                "Sequencer phase"
            );

            phase = match phase {
                Phase::Dispatching => self.dispatch(state).await,
                Phase::Executing(step) => self.execute(step, state, &mut report).await,
                Phase::Summarizing => {
                    let (summary, next) = self.summarize(state).await;
                    report.summary = Some(summary);
                    next
                }
                Phase::AwaitingHuman => break,
                Phase::Terminated => {
                    report.terminated = true;
                    break;
                }
            };
        }

        report
    }
}
