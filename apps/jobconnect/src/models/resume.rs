use serde::{Deserialize, Serialize};

/// Structured facts pulled out of free-form resume text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeInfo {
    pub name: Option<String>,
    pub years_experience: Option<u32>,
    /// Lowercased, sorted, de-duplicated.
    pub skills: Vec<String>,
}
