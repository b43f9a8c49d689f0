//! Step Registry: the fixed, ordered list of steps a session can run.

use std::fmt;
use std::str::FromStr;

/// Closed set of step identifiers. Each is bound to one handler in the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    ResumeParser,
    JobSearch,
    RelevanceScorer,
    PitchGenerator,
    VictimMother,
    PoliceOfficer,
    Activist,
    CriminalMother,
}

impl StepId {
    pub const ALL: [StepId; 8] = [
        StepId::ResumeParser,
        StepId::JobSearch,
        StepId::RelevanceScorer,
        StepId::PitchGenerator,
        StepId::VictimMother,
        StepId::PoliceOfficer,
        StepId::Activist,
        StepId::CriminalMother,
    ];

    /// Stable wire name used in prompts, logs and coordinator replies.
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::ResumeParser => "resume_parser",
            StepId::JobSearch => "job_search",
            StepId::RelevanceScorer => "relevance_scorer",
            StepId::PitchGenerator => "pitch_generator",
            StepId::VictimMother => "victim_mother",
            StepId::PoliceOfficer => "police_officer",
            StepId::Activist => "activist",
            StepId::CriminalMother => "criminal_mother",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStep(pub String);

impl fmt::Display for UnknownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown step '{}'", self.0)
    }
}

impl std::error::Error for UnknownStep {}

impl FromStr for StepId {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StepId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or(UnknownStep(s.to_string()))
    }
}

/// A step's own opinion about what should follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    Step(StepId),
    /// Hand control back to the human.
    Human,
}

/// Outcome of a positional lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Run(StepId),
    /// Cursor is past the last step.
    Complete,
}

/// Ordered, immutable list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Vec<StepId>,
}

impl StepRegistry {
    pub fn new(steps: Vec<StepId>) -> Self {
        Self { steps }
    }

    /// `registry[i]` for any in-range cursor; `Complete` for every other value.
    pub fn next_step_for(&self, stage_index: usize) -> Resolution {
        match self.steps.get(stage_index) {
            Some(id) => Resolution::Run(*id),
            None => Resolution::Complete,
        }
    }

    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_registry() -> StepRegistry {
        StepRegistry::new(vec![
            StepId::ResumeParser,
            StepId::JobSearch,
            StepId::RelevanceScorer,
            StepId::PitchGenerator,
        ])
    }

    #[test]
    fn test_lookup_in_range_returns_step_at_position() {
        let registry = job_registry();
        assert_eq!(registry.next_step_for(0), Resolution::Run(StepId::ResumeParser));
        assert_eq!(registry.next_step_for(3), Resolution::Run(StepId::PitchGenerator));
    }

    #[test]
    fn test_lookup_past_end_is_complete_for_every_position() {
        let registry = job_registry();
        for index in [4, 5, 17, 1_000, usize::MAX] {
            assert_eq!(registry.next_step_for(index), Resolution::Complete);
        }
    }

    #[test]
    fn test_empty_registry_is_always_complete() {
        let registry = StepRegistry::new(vec![]);
        assert!(registry.steps().is_empty());
        assert_eq!(registry.next_step_for(0), Resolution::Complete);
    }

    #[test]
    fn test_step_id_round_trips_through_wire_name() {
        for id in StepId::ALL {
            assert_eq!(id.as_str().parse::<StepId>().unwrap(), id);
        }
    }

    #[test]
    fn test_step_id_parse_ignores_case_and_padding() {
        assert_eq!(" Police_Officer\n".parse::<StepId>().unwrap(), StepId::PoliceOfficer);
    }

    #[test]
    fn test_step_id_parse_rejects_unknown_names() {
        let err = "invalid".parse::<StepId>().unwrap_err();
        assert_eq!(err, UnknownStep("invalid".to_string()));
    }
}
