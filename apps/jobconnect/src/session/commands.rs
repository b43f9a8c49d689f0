//! Named human commands. Each one edits the human-owned session inputs and
//! returns notes (role `system`) that are logged right after the human line.

use std::path::Path;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::job::SearchPreferences;
use crate::models::message::Message;
use crate::sequencer::state::SharedState;
use crate::session::input::InputSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Option<String>),
    Prefs,
    Search,
    Show,
    /// Anything else: plain conversation.
    Text,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Command::Text;
        };

        match first.to_lowercase().as_str() {
            "upload" | "u" => {
                let rest = words.collect::<Vec<_>>().join(" ");
                Command::Upload(Some(rest).filter(|p| !p.is_empty()))
            }
            "prefs" | "preferences" => Command::Prefs,
            "search" | "s" => Command::Search,
            "show" | "status" => Command::Show,
            _ => Command::Text,
        }
    }
}

/// Runs `command`, prompting through `input` when it needs more detail.
pub async fn apply(
    command: Command,
    state: &mut SharedState,
    input: &mut dyn InputSource,
) -> Result<Vec<Message>, AppError> {
    let note = match command {
        Command::Text => return Ok(Vec::new()),
        Command::Upload(path) => {
            let path = match path {
                Some(p) => Some(p),
                None => ask(input, "Path to resume (.txt or .pdf): ").await?,
            };
            match path {
                Some(path) => upload(state, &path).await,
                None => "No file given; resume unchanged.".to_string(),
            }
        }
        Command::Prefs => set_preferences(state, input).await?,
        Command::Search => ensure_search(state),
        Command::Show => status(state),
    };

    debug!(%note, "Command applied");
    Ok(vec![Message::system(note)])
}

/// Blank answers and end of input both mean "nothing".
async fn ask(input: &mut dyn InputSource, prompt: &str) -> Result<Option<String>, AppError> {
    Ok(input
        .read_line(prompt)
        .await?
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty()))
}

async fn upload(state: &mut SharedState, path: &str) -> String {
    match read_resume(Path::new(path)).await {
        Ok(text) if text.trim().is_empty() => format!("Resume file {path} has no readable text."),
        Ok(text) => {
            let chars = text.chars().count();
            state.inputs.resume_text = Some(text);
            format!("Loaded resume from {path} ({chars} chars).")
        }
        Err(e) => {
            warn!(%path, error = %e, "Resume upload failed");
            format!("Could not read resume from {path}: {e}")
        }
    }
}

/// `.pdf` goes through text extraction; anything else is read as UTF-8 text.
pub async fn read_resume(path: &Path) -> Result<String, AppError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if !is_pdf {
        return Ok(tokio::fs::read_to_string(path).await?);
    }

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .map_err(anyhow::Error::from)?
        .map_err(|e| AppError::Input(format!("PDF extraction failed: {e}")))
}

async fn set_preferences(
    state: &mut SharedState,
    input: &mut dyn InputSource,
) -> Result<String, AppError> {
    let location = ask(input, "Preferred location (blank for any): ").await?;
    let job_type = ask(input, "Job type (default Any): ")
        .await?
        .unwrap_or_else(|| "Any".to_string());
    let keywords: Vec<String> = ask(input, "Keywords (comma-separated): ")
        .await?
        .map(|raw| {
            raw.split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let note = format!(
        "Search preferences set: location={}, type={} (informational, listings carry no job type), keywords={}.",
        location.as_deref().unwrap_or("any"),
        job_type,
        if keywords.is_empty() { "none".to_string() } else { keywords.join(", ") }
    );

    state.inputs.search = Some(SearchPreferences {
        location,
        job_type: Some(job_type),
        keywords,
    });
    Ok(note)
}

fn ensure_search(state: &mut SharedState) -> String {
    if let Some(prefs) = &state.inputs.search {
        return format!("Searching with keywords: {}.", prefs.keywords.join(", "));
    }

    let skills = state
        .payload
        .resume_info
        .as_ref()
        .map(|i| i.skills.clone())
        .unwrap_or_default();

    if skills.is_empty() {
        return "No preferences or parsed skills yet; searching with the default query.".to_string();
    }

    let note = format!("Searching with resume skills: {}.", skills.join(", "));
    state.inputs.search = Some(SearchPreferences {
        keywords: skills,
        ..SearchPreferences::default()
    });
    note
}

fn status(state: &SharedState) -> String {
    let count = |v: Option<usize>| v.unwrap_or(0);
    format!(
        "Stage {}, {} turns left. Resume: {}. Jobs found: {}. Jobs scored: {}. Pitch: {}.",
        state.stage_index,
        state.turns_remaining,
        if state.inputs.resume_text.is_some() { "loaded" } else { "not loaded" },
        count(state.payload.job_listings.as_ref().map(Vec::len)),
        count(state.payload.scored_jobs.as_ref().map(Vec::len)),
        if state.payload.final_pitch.is_some() { "ready" } else { "not yet" },
    )
}
