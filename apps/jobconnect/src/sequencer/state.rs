//! Shared State: the single record threaded through every step of a session.
//!
//! Merge rule: a step's message delta is appended to `message_log`; every payload
//! field the step returns overlays the previous value, fields it leaves `None`
//! are untouched. Nothing else in the record is writable by a step.

use crate::models::job::{JobListing, ScoredJob, SearchPreferences};
use crate::models::message::{Message, Role};
use crate::models::resume::ResumeInfo;
use crate::sequencer::registry::Handoff;

/// Names of the payload fields, used to declare which step owns what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadField {
    ResumeInfo,
    JobListings,
    ScoredJobs,
    FinalPitch,
}

/// Pipeline-specific payload. Doubles as the partial-update record a step returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub resume_info: Option<ResumeInfo>,
    pub job_listings: Option<Vec<JobListing>>,
    pub scored_jobs: Option<Vec<ScoredJob>>,
    pub final_pitch: Option<String>,
}

impl Payload {
    /// Fields this record carries a value for.
    pub fn written_fields(&self) -> Vec<PayloadField> {
        let mut fields = Vec::new();
        if self.resume_info.is_some() {
            fields.push(PayloadField::ResumeInfo);
        }
        if self.job_listings.is_some() {
            fields.push(PayloadField::JobListings);
        }
        if self.scored_jobs.is_some() {
            fields.push(PayloadField::ScoredJobs);
        }
        if self.final_pitch.is_some() {
            fields.push(PayloadField::FinalPitch);
        }
        fields
    }

    /// Clears every field not in `owned`, returning the ones that were dropped.
    pub fn retain_owned(&mut self, owned: &[PayloadField]) -> Vec<PayloadField> {
        let dropped: Vec<PayloadField> = self
            .written_fields()
            .into_iter()
            .filter(|f| !owned.contains(f))
            .collect();

        for field in &dropped {
            match field {
                PayloadField::ResumeInfo => self.resume_info = None,
                PayloadField::JobListings => self.job_listings = None,
                PayloadField::ScoredJobs => self.scored_jobs = None,
                PayloadField::FinalPitch => self.final_pitch = None,
            }
        }
        dropped
    }

    /// New values overlay old ones; absent values leave the old ones in place.
    pub fn overlay(&mut self, update: Payload) {
        if let Some(v) = update.resume_info {
            self.resume_info = Some(v);
        }
        if let Some(v) = update.job_listings {
            self.job_listings = Some(v);
        }
        if let Some(v) = update.scored_jobs {
            self.scored_jobs = Some(v);
        }
        if let Some(v) = update.final_pitch {
            self.final_pitch = Some(v);
        }
    }
}

/// Inputs owned by the human. Only the human-input action writes these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInputs {
    pub resume_text: Option<String>,
    /// Free-text query from the demo scenario picked at startup.
    pub scenario_query: Option<String>,
    pub search: Option<SearchPreferences>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedState {
    /// Append-only within a session.
    pub message_log: Vec<Message>,
    /// Unsigned, so never observed negative.
    pub turns_remaining: u32,
    /// Not clamped to the registry length.
    pub stage_index: usize,
    /// Last hint returned by a step.
    pub pending_next_step: Option<Handoff>,
    pub inputs: SessionInputs,
    pub payload: Payload,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_human_message(&self) -> Option<&Message> {
        self.message_log.iter().rev().find(|m| m.role == Role::User)
    }

    /// Applies one step's update according to the merge rule.
    pub fn merge(&mut self, messages: Vec<Message>, payload: Payload) {
        self.message_log.extend(messages);
        self.payload.overlay(payload);
    }

    /// Forgets everything a previous conversation produced, keeping human inputs.
    pub fn clear_history(&mut self) {
        self.message_log.clear();
        self.payload = Payload::default();
        self.pending_next_step = None;
    }
}
