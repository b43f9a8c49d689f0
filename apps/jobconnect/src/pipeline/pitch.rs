use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::job::JobListing;
use crate::models::message::Message;
use crate::sequencer::executor::{Step, StepOutput};
use crate::sequencer::registry::{Handoff, StepId};
use crate::sequencer::state::{Payload, PayloadField, SharedState};
use crate::tools::ReferenceLookup;

pub struct PitchGeneratorStep {
    lookup: Arc<dyn ReferenceLookup>,
}

/// What the pitch is built from.
struct PitchFacts<'a> {
    name: &'a str,
    skills: String,
    jobline: String,
    company: Option<&'a str>,
}

impl<'a> PitchFacts<'a> {
    fn gather(state: &'a SharedState) -> Self {
        let info = state.payload.resume_info.as_ref();

        let name = info
            .and_then(|i| i.name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Candidate");

        let skills = info
            .map(|i| i.skills.join(", "))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "relevant experience".to_string());

        // An unscored listing stands in for both the role line and the company.
        let best: Option<&JobListing> = state
            .payload
            .scored_jobs
            .as_ref()
            .and_then(|s| s.first())
            .map(|s| &s.job)
            .or_else(|| state.payload.job_listings.as_ref().and_then(|j| j.first()));

        let jobline = best
            .filter(|j| !j.title.is_empty() && !j.company.is_empty())
            .map(|j| format!("{} at {}", j.title, j.company))
            .unwrap_or_else(|| "the role".to_string());

        let company = best.map(|j| j.company.trim()).filter(|c| is_usable_company(c));

        Self {
            name,
            skills,
            jobline,
            company,
        }
    }

    fn opening(&self) -> String {
        format!(
            "Hi Hiring Team, I'm {}. I've worked extensively with {} and I'm excited about {}. \
             I believe my background aligns well with your needs.",
            self.name, self.skills, self.jobline
        )
    }
}

fn is_usable_company(company: &str) -> bool {
    !matches!(company.to_lowercase().as_str(), "" | "none" | "null")
}

const CLOSING: &str = "I'd love to discuss how I can contribute. Thanks for your consideration.";

impl PitchGeneratorStep {
    pub fn new(lookup: Arc<dyn ReferenceLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Step for PitchGeneratorStep {
    fn id(&self) -> StepId {
        StepId::PitchGenerator
    }

    fn owns(&self) -> &'static [PayloadField] {
        &[PayloadField::FinalPitch]
    }

    async fn run(&self, state: &SharedState) -> Result<StepOutput, AppError> {
        let facts = PitchFacts::gather(state);

        let (status, pitch) = match facts.company {
            None => {
                debug!("No company to look up, using fallback pitch");
                (
                    "Generated a fallback pitch (no company info available).".to_string(),
                    format!("{} {}", facts.opening(), CLOSING),
                )
            }
            Some(company) => match self.lookup.summary(company).await {
                Ok(summary) => {
                    let company_info = summary
                        .unwrap_or_else(|| format!("No Wikipedia introduction found for '{company}'."));
                    (
                        "Generated a tailored pitch using Wikipedia company info. \
                         Used [TOOL] Wikipedia to fetch company summary."
                            .to_string(),
                        format!(
                            "{} Here's what excites me about {company}: {company_info}\n{}",
                            facts.opening(),
                            CLOSING
                        ),
                    )
                }
                Err(e) => {
                    warn!(%company, error = %e, "Company lookup failed, using fallback pitch");
                    (
                        "Generated a fallback pitch (company lookup unavailable).".to_string(),
                        format!("{} {}", facts.opening(), CLOSING),
                    )
                }
            },
        };

        Ok(StepOutput {
            messages: vec![
                Message::assistant(status),
                Message::assistant(format!("=== PITCH ===\n{pitch}")),
            ],
            next: Some(Handoff::Human),
            payload: Payload {
                final_pitch: Some(pitch),
                ..Payload::default()
            },
        })
    }
}
