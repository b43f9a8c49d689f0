use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::job::{JobListing, SearchQuery};
use crate::models::message::Message;
use crate::sequencer::executor::{Step, StepOutput};
use crate::sequencer::registry::{Handoff, StepId};
use crate::sequencer::state::{Payload, PayloadField, SharedState};

/// Where listings come from. The built-in board is in-memory; a real scraper would
/// implement the same trait.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobListing>, AppError>;
}

pub struct MockJobBoard {
    listings: Vec<JobListing>,
}

impl MockJobBoard {
    pub fn new(listings: Vec<JobListing>) -> Self {
        Self { listings }
    }

    /// A JSON array of `{title, company, location, keywords}` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let listings: Vec<JobListing> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid job listings file {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), count = listings.len(), "Loaded job listings");
        Ok(Self::new(listings))
    }

    /// Twelve mock postings across the Singapore tech market.
    pub fn singapore() -> Self {
        let job = |title: &str, company: &str, keywords: &[&str]| JobListing {
            title: title.to_string(),
            company: company.to_string(),
            location: "Singapore".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };

        Self::new(vec![
            job(
                "Python Backend Engineer",
                "Lion City Tech",
                &["python", "docker", "aws", "microservices", "sql"],
            ),
            job(
                "Full-stack Engineer (Angular + Spring Boot)",
                "Harbour Systems",
                &["angular", "spring boot", "java", "sql", "docker"],
            ),
            job(
                "Data Engineer",
                "Marina Analytics",
                &["python", "sql", "aws", "kubernetes", "spark"],
            ),
            job(
                "Platform Engineer",
                "Cloudy",
                &["kubernetes", "terraform", "aws", "python", "ci/cd"],
            ),
            job(
                "Site Reliability Engineer (SRE)",
                "Keppel Digital",
                &["linux", "kubernetes", "observability", "python", "oncall"],
            ),
            job(
                "Frontend Engineer (React)",
                "Orchard Labs",
                &["react", "typescript", "javascript", "testing", "ci"],
            ),
            job(
                "Mobile Engineer (Flutter)",
                "Bukit Apps",
                &["flutter", "dart", "firebase", "mobile ci", "ux"],
            ),
            job(
                "QA Automation Engineer",
                "Marina QA",
                &["selenium", "cypress", "pytest", "python", "ci/cd"],
            ),
            job(
                "ML Engineer",
                "Sentosa AI",
                &["python", "pytorch", "mlops", "docker", "kubernetes"],
            ),
            job(
                "Backend Engineer (Go)",
                "Bukit Backend",
                &["golang", "grpc", "docker", "kubernetes", "sql"],
            ),
            job(
                "Solutions Architect (Java/Spring)",
                "Harbour Enterprise",
                &["spring", "spring boot", "java", "microservices", "aws"],
            ),
            job(
                "Full-stack Engineer (Angular/Node)",
                "Jurong Works",
                &["angular", "nodejs", "typescript", "rest", "sql"],
            ),
        ])
    }
}

/// Any-of match: a listing qualifies if some term is a substring of its
/// lowercased title plus keywords. No terms means every listing qualifies.
pub fn matches(job: &JobListing, query: &SearchQuery) -> bool {
    if let Some(location) = &query.location {
        if !job.location.eq_ignore_ascii_case(location.trim()) {
            return false;
        }
    }

    if query.terms.is_empty() {
        return true;
    }

    let haystack = std::iter::once(job.title.to_lowercase())
        .chain(job.keywords.iter().map(|k| k.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ");

    query.terms.iter().any(|term| haystack.contains(term.as_str()))
}

#[async_trait]
impl JobSource for MockJobBoard {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobListing>, AppError> {
        Ok(self
            .listings
            .iter()
            .filter(|job| matches(job, query))
            .cloned()
            .collect())
    }
}

pub struct JobSearchStep {
    source: Arc<dyn JobSource>,
}

impl JobSearchStep {
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        Self { source }
    }
}

/// Search preferences win, then the scenario query, then the parsed skills.
pub fn query_for(state: &SharedState) -> SearchQuery {
    if let Some(prefs) = &state.inputs.search {
        return SearchQuery::from_preferences(prefs);
    }
    if let Some(text) = &state.inputs.scenario_query {
        return SearchQuery::from_text(text);
    }
    let skills = state
        .payload
        .resume_info
        .as_ref()
        .map(|info| info.skills.join(" "))
        .unwrap_or_default();
    SearchQuery::from_text(&skills)
}

#[async_trait]
impl Step for JobSearchStep {
    fn id(&self) -> StepId {
        StepId::JobSearch
    }

    fn owns(&self) -> &'static [PayloadField] {
        &[PayloadField::JobListings]
    }

    async fn run(&self, state: &SharedState) -> Result<StepOutput, AppError> {
        let query = query_for(state);
        debug!(terms = ?query.terms, location = ?query.location, "Searching jobs");

        let jobs = self.source.search(&query).await?;

        Ok(StepOutput {
            messages: vec![Message::assistant(format!(
                "Found {} jobs matching your query.",
                jobs.len()
            ))],
            next: Some(Handoff::Step(StepId::RelevanceScorer)),
            payload: Payload {
                job_listings: Some(jobs),
                ..Payload::default()
            },
        })
    }
}
