//! Side-effecting helpers the steps call: reference summaries and the local clock.

pub mod clock;
pub mod wikipedia;

pub use wikipedia::{ReferenceLookup, WikipediaClient};
