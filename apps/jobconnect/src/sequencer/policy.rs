//! Next-step policies: the pluggable "who runs next" decision.
//!
//! `PositionalPolicy` walks the registry by `stage_index`.
//! `CoordinatorPolicy` asks a coordinator to pick from a fixed candidate set and
//! falls back to a uniform random candidate when the pick is invalid or the call fails.

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::message::Message;
use crate::sequencer::registry::{Resolution, StepId, StepRegistry};
use crate::sequencer::state::SharedState;

/// Chooses the next speaker from the conversation so far.
/// The reply is free text; the policy validates it.
#[async_trait]
pub trait Coordinator: Send + Sync {
    async fn choose_next(
        &self,
        candidates: &[StepId],
        message_log: &[Message],
    ) -> Result<String, AppError>;
}

#[async_trait]
pub trait NextStepPolicy: Send {
    async fn resolve(&mut self, state: &SharedState) -> Resolution;

    /// For logs.
    fn name(&self) -> &'static str;
}

pub struct PositionalPolicy {
    registry: StepRegistry,
}

impl PositionalPolicy {
    pub fn new(registry: StepRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl NextStepPolicy for PositionalPolicy {
    async fn resolve(&mut self, state: &SharedState) -> Resolution {
        let resolution = self.registry.next_step_for(state.stage_index);
        debug!(stage_index = state.stage_index, ?resolution, "Positional lookup");
        resolution
    }

    fn name(&self) -> &'static str {
        "positional"
    }
}

pub struct CoordinatorPolicy {
    candidates: Vec<StepId>,
    coordinator: Arc<dyn Coordinator>,
    rng: StdRng,
}

impl CoordinatorPolicy {
    /// `seed` makes the fallback pick reproducible.
    pub fn new(
        candidates: StepRegistry,
        coordinator: Arc<dyn Coordinator>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            candidates: candidates.steps().to_vec(),
            coordinator,
            rng: seed
                .map(StdRng::seed_from_u64)
                .unwrap_or_else(StdRng::from_entropy),
        }
    }

    fn random_candidate(&mut self) -> Resolution {
        match self.candidates.choose(&mut self.rng) {
            Some(id) => Resolution::Run(*id),
            None => Resolution::Complete,
        }
    }
}

#[async_trait]
impl NextStepPolicy for CoordinatorPolicy {
    async fn resolve(&mut self, state: &SharedState) -> Resolution {
        let reply = self
            .coordinator
            .choose_next(&self.candidates, &state.message_log)
            .await;

        match reply {
            Ok(reply) => match reply.parse::<StepId>() {
                Ok(id) if self.candidates.contains(&id) => {
                    debug!(step = %id, "Coordinator selected");
                    Resolution::Run(id)
                }
                _ => {
                    let fallback = self.random_candidate();
                    warn!(reply = %reply.trim(), ?fallback, "Invalid coordinator choice, random fallback");
                    fallback
                }
            },
            Err(e) => {
                let fallback = self.random_candidate();
                warn!(error = %e, ?fallback, "Coordinator failed, random fallback");
                fallback
            }
        }
    }

    fn name(&self) -> &'static str {
        "coordinator"
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::testing::{DownCoordinator, FixedCoordinator};
    use super::*;

    fn trio() -> StepRegistry {
        StepRegistry::new(vec![StepId::VictimMother, StepId::PoliceOfficer, StepId::Activist])
    }

    #[tokio::test]
    async fn test_positional_policy_follows_stage_index() {
        let mut policy = PositionalPolicy::new(StepRegistry::new(vec![
            StepId::ResumeParser,
            StepId::JobSearch,
        ]));
        let mut state = SharedState::new();

        assert_eq!(policy.resolve(&state).await, Resolution::Run(StepId::ResumeParser));
        state.stage_index = 1;
        assert_eq!(policy.resolve(&state).await, Resolution::Run(StepId::JobSearch));
        state.stage_index = 2;
        assert_eq!(policy.resolve(&state).await, Resolution::Complete);
        state.stage_index = 99;
        assert_eq!(policy.resolve(&state).await, Resolution::Complete);
    }

    #[tokio::test]
    async fn test_valid_coordinator_choice_is_used() {
        let mut policy = CoordinatorPolicy::new(trio(), Arc::new(FixedCoordinator(" Activist\n")), Some(1));
        assert_eq!(
            policy.resolve(&SharedState::new()).await,
            Resolution::Run(StepId::Activist)
        );
    }

    #[tokio::test]
    async fn test_known_step_outside_candidates_falls_back() {
        let mut policy =
            CoordinatorPolicy::new(trio(), Arc::new(FixedCoordinator("criminal_mother")), Some(7));
        let Resolution::Run(id) = policy.resolve(&SharedState::new()).await else {
            panic!("fallback must pick a candidate");
        };
        assert!(trio().steps().contains(&id));
        assert_ne!(id, StepId::CriminalMother);
    }

    #[tokio::test]
    async fn test_failing_coordinator_falls_back_to_candidate() {
        let mut policy = CoordinatorPolicy::new(trio(), Arc::new(DownCoordinator), Some(3));
        let Resolution::Run(id) = policy.resolve(&SharedState::new()).await else {
            panic!("fallback must pick a candidate");
        };
        assert!(trio().steps().contains(&id));
    }

    #[tokio::test]
    async fn test_invalid_choice_fallback_is_uniform_across_trials() {
        let mut policy = CoordinatorPolicy::new(trio(), Arc::new(FixedCoordinator("invalid")), Some(42));
        let state = SharedState::new();
        let trials = 3_000;
        let mut counts: HashMap<StepId, usize> = HashMap::new();

        for _ in 0..trials {
            match policy.resolve(&state).await {
                Resolution::Run(id) => *counts.entry(id).or_default() += 1,
                Resolution::Complete => panic!("fallback must never complete"),
            }
        }

        assert_eq!(counts.len(), 3, "every candidate must be reachable: {counts:?}");
        for (id, count) in &counts {
            // Expected 1000 each; ±150 is roughly six standard deviations.
            assert!((850..=1150).contains(count), "{id} picked {count} times");
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_set_completes() {
        let mut policy = CoordinatorPolicy::new(
            StepRegistry::new(vec![]),
            Arc::new(FixedCoordinator("activist")),
            Some(1),
        );
        assert_eq!(policy.resolve(&SharedState::new()).await, Resolution::Complete);
    }
}
