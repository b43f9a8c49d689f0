// Shared prompt fragments.
// Each collaborator that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Appended to prompts whose output is shown verbatim in the terminal.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond in plain text. Do NOT use markdown headings, tables or code fences. \
    Do NOT include explanations about these instructions.";

/// Appended to prompts whose output is parsed as a single identifier.
pub const IDENTIFIER_ONLY_INSTRUCTION: &str = "\
    Respond with ONLY the identifier, exactly as written in the list. \
    No punctuation, no quotes, no other words.";
