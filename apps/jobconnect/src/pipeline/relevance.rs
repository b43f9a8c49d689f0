use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::job::{JobListing, ScoredJob};
use crate::models::message::Message;
use crate::sequencer::executor::{Step, StepOutput};
use crate::sequencer::registry::{Handoff, StepId};
use crate::sequencer::state::{Payload, PayloadField, SharedState};

const POINTS_PER_SHARED_SKILL: u32 = 10;
const TOP_N: usize = 5;

/// Scores one listing against the candidate's skills.
pub fn score_job(skills: &[String], job: &JobListing) -> ScoredJob {
    let skill_set: BTreeSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let keyword_set: BTreeSet<String> = job.keywords.iter().map(|k| k.to_lowercase()).collect();

    let overlap: Vec<String> = skill_set.intersection(&keyword_set).cloned().collect();

    ScoredJob {
        job: job.clone(),
        score: overlap.len() as u32 * POINTS_PER_SHARED_SKILL,
        overlap,
    }
}

/// Highest score first; ties broken by title.
pub fn rank(skills: &[String], jobs: &[JobListing]) -> Vec<ScoredJob> {
    let mut scored: Vec<ScoredJob> = jobs.iter().map(|j| score_job(skills, j)).collect();
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.job.title.cmp(&b.job.title))
    });
    scored
}

pub fn top_matches_message(scored: &[ScoredJob]) -> String {
    if scored.is_empty() {
        return "No jobs to score.".to_string();
    }

    let lines: Vec<String> = scored
        .iter()
        .take(TOP_N)
        .enumerate()
        .map(|(i, s)| {
            let mut line = format!(
                "{}. {} @ {} — {}/100",
                i + 1,
                s.job.title,
                s.job.company,
                s.score
            );
            if !s.overlap.is_empty() {
                line.push_str(&format!(" (overlap: {})", s.overlap.join(", ")));
            }
            line
        })
        .collect();

    format!("Top matches:\n{}", lines.join("\n"))
}

pub struct RelevanceScorerStep;

#[async_trait]
impl Step for RelevanceScorerStep {
    fn id(&self) -> StepId {
        StepId::RelevanceScorer
    }

    fn owns(&self) -> &'static [PayloadField] {
        &[PayloadField::ScoredJobs]
    }

    async fn run(&self, state: &SharedState) -> Result<StepOutput, AppError> {
        let skills = state
            .payload
            .resume_info
            .as_ref()
            .map(|info| info.skills.as_slice())
            .unwrap_or_default();
        let jobs = state.payload.job_listings.as_deref().unwrap_or_default();

        let scored = rank(skills, jobs);

        Ok(StepOutput {
            messages: vec![Message::assistant(top_matches_message(&scored))],
            next: Some(Handoff::Step(StepId::PitchGenerator)),
            payload: Payload {
                scored_jobs: Some(scored),
                ..Payload::default()
            },
        })
    }
}
