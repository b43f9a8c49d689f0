//! Job pipeline: resume parser → job search → relevance scorer → pitch generator.
//!
//! Steps are pure over Shared State except for their injected collaborators
//! (`JobSource`, `ReferenceLookup`). Each one hints the next; the pitch generator
//! hands control back to the human.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::AppError;
use crate::sequencer::executor::StepExecutor;
use crate::sequencer::registry::{StepId, StepRegistry};
use crate::tools::ReferenceLookup;

pub mod job_search;
pub mod pitch;
pub mod relevance;
pub mod resume_parser;
pub mod scenarios;

use job_search::{JobSearchStep, JobSource};
use pitch::PitchGeneratorStep;
use relevance::RelevanceScorerStep;
use resume_parser::ResumeParserStep;

pub const PIPELINE_ORDER: [StepId; 4] = [
    StepId::ResumeParser,
    StepId::JobSearch,
    StepId::RelevanceScorer,
    StepId::PitchGenerator,
];

pub fn registry() -> StepRegistry {
    StepRegistry::new(PIPELINE_ORDER.to_vec())
}

pub fn executor(
    step_timeout: Duration,
    jobs: Arc<dyn JobSource>,
    lookup: Arc<dyn ReferenceLookup>,
) -> Result<StepExecutor, AppError> {
    Ok(StepExecutor::new(step_timeout)
        .register(Arc::new(ResumeParserStep::new()?))
        .register(Arc::new(JobSearchStep::new(jobs)))
        .register(Arc::new(RelevanceScorerStep))
        .register(Arc::new(PitchGeneratorStep::new(lookup))))
}
