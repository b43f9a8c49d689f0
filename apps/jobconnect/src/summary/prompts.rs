// All LLM prompt constants for the Summary collaborator.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Observer prompt for the job pipeline.
pub const JOB_SEARCH_SUMMARY_SYSTEM: &str = "You are the observer of a job search multi-step run.

Summarize crisply:
1) What each step accomplished (Resume Parser, Job Search, Relevance Scorer, Pitch Generator).
2) Key data passed between steps (skills, listings, scores, final pitch).
3) Final recommendation / next action for the user.

Keep it short, structured, and readable.";

/// Moderator prompt for the persona debate.
pub const DEBATE_SUMMARY_SYSTEM: &str = "You are the moderator of an ethics board discussion on capital punishment.

Summarize crisply:
1) Which participants spoke and the position each one took.
2) Points of agreement and the sharpest disagreements.
3) Open questions the board should take up next time.

Keep it short, balanced, and respectful.";

/// Summary request template. Replace `{transcript}` before sending.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "Transcript / log:

{transcript}

Please summarize the outcome for the end-of-run report.";
