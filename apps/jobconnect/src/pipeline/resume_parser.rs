use std::collections::BTreeSet;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::errors::AppError;
use crate::models::message::Message;
use crate::models::resume::ResumeInfo;
use crate::sequencer::executor::{Step, StepOutput};
use crate::sequencer::registry::{Handoff, StepId};
use crate::sequencer::state::{Payload, PayloadField, SharedState};

/// Technologies recognised in resume text. Matched as lowercase substrings,
/// so "javascript" also yields "java" and "spring boot" also yields "spring".
pub const SKILL_BAG: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "c++",
    "spring",
    "spring boot",
    "angular",
    "react",
    "sql",
    "postgres",
    "mysql",
    "db2",
    "docker",
    "kubernetes",
    "aws",
    "gcp",
    "azure",
    "git",
    "maven",
    "jest",
    "junit",
    "redis",
    "microservices",
];

pub struct ResumeParserStep {
    name_re: Regex,
    years_re: Regex,
}

impl ResumeParserStep {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            name_re: Regex::new(r"(?i)(?:Name|Candidate)[:\-]\s*([A-Za-z .'-]{2,})")
                .map_err(anyhow::Error::from)?,
            years_re: Regex::new(r"(?i)(\d+)\s*\+?\s*(?:years|yrs)").map_err(anyhow::Error::from)?,
        })
    }

    pub fn parse(&self, text: &str) -> ResumeInfo {
        let text = text.trim();

        let name = self
            .name_re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|n| !n.is_empty());

        let years_experience = self
            .years_re
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        let lower = text.to_lowercase();
        let skills: BTreeSet<&str> = SKILL_BAG
            .iter()
            .copied()
            .filter(|skill| lower.contains(skill))
            .collect();

        ResumeInfo {
            name,
            years_experience,
            skills: skills.into_iter().map(str::to_string).collect(),
        }
    }
}

pub fn describe(info: &ResumeInfo) -> String {
    let skills = if info.skills.is_empty() {
        "—".to_string()
    } else {
        info.skills.join(", ")
    };
    let years = info
        .years_experience
        .map(|y| y.to_string())
        .unwrap_or_else(|| "—".to_string());
    format!("Parsed resume. Skills: {skills}. Experience: {years} yrs.")
}

#[async_trait]
impl Step for ResumeParserStep {
    fn id(&self) -> StepId {
        StepId::ResumeParser
    }

    fn owns(&self) -> &'static [PayloadField] {
        &[PayloadField::ResumeInfo]
    }

    async fn run(&self, state: &SharedState) -> Result<StepOutput, AppError> {
        let info = self.parse(state.inputs.resume_text.as_deref().unwrap_or_default());
        debug!(skills = info.skills.len(), years = ?info.years_experience, "Parsed resume");

        Ok(StepOutput {
            messages: vec![Message::assistant(describe(&info))],
            next: Some(Handoff::Step(StepId::JobSearch)),
            payload: Payload {
                resume_info: Some(info),
                ..Payload::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ResumeParserStep {
        ResumeParserStep::new().unwrap()
    }

    #[test]
    fn test_extracts_name_years_and_sorted_skills() {
        let info = parser().parse(
            "Name: Ada Lim\nSenior engineer, 5 years with Python, Angular, Spring Boot, SQL, AWS, Docker.",
        );
        assert_eq!(info.name.as_deref(), Some("Ada Lim"));
        assert_eq!(info.years_experience, Some(5));
        assert_eq!(
            info.skills,
            vec!["angular", "aws", "docker", "python", "spring", "spring boot", "sql"]
        );
    }

    #[test]
    fn test_candidate_label_and_plus_years() {
        let info = parser().parse("Candidate- Wei Jie, backend developer, 6+ yrs in Java.");
        assert_eq!(info.name.as_deref(), Some("Wei Jie"));
        assert_eq!(info.years_experience, Some(6));
        assert_eq!(info.skills, vec!["java"]);
    }

    #[test]
    fn test_empty_text_yields_empty_info() {
        assert_eq!(parser().parse("   "), ResumeInfo::default());
    }

    #[test]
    fn test_description_uses_dash_for_missing_values() {
        assert_eq!(
            describe(&ResumeInfo::default()),
            "Parsed resume. Skills: —. Experience: — yrs."
        );
    }

    #[tokio::test]
    async fn test_step_reads_resume_input_and_hints_job_search() {
        let mut state = SharedState::new();
        state.inputs.resume_text = Some("Data engineer, 5 years in Python, SQL.".to_string());

        let output = parser().run(&state).await.unwrap();

        assert_eq!(
            output.messages,
            vec![Message::assistant("Parsed resume. Skills: python, sql. Experience: 5 yrs.")]
        );
        assert_eq!(output.next, Some(Handoff::Step(StepId::JobSearch)));
        assert_eq!(output.payload.written_fields(), vec![PayloadField::ResumeInfo]);
    }
}
