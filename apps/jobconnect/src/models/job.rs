use serde::{Deserialize, Serialize};

/// A single posting on the job board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub keywords: Vec<String>,
}

/// A listing together with its skill-overlap score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredJob {
    pub job: JobListing,
    pub score: u32, // 0 – 100, 10 points per shared skill
    pub overlap: Vec<String>,
}

/// Search preferences supplied by the human (`prefs`/`search` commands).
/// `job_type` is kept for display only; listings have no type to match against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPreferences {
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub keywords: Vec<String>,
}

/// What the job board is actually asked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Lowercased, whitespace-split terms. Empty matches every listing.
    pub terms: Vec<String>,
    pub location: Option<String>,
}

impl SearchQuery {
    pub fn from_text(text: &str) -> Self {
        Self {
            terms: text.split_whitespace().map(|t| t.to_lowercase()).collect(),
            location: None,
        }
    }

    /// Multi-word keywords ("spring boot") become separate terms, as in free text.
    pub fn from_preferences(prefs: &SearchPreferences) -> Self {
        Self {
            location: prefs.location.clone(),
            ..Self::from_text(&prefs.keywords.join(" "))
        }
    }
}
