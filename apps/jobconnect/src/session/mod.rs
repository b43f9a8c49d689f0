//! Interactive session: reads human lines, applies named commands, runs one
//! sequencer turn per line and prints what the steps said.

use std::io::Write;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::message::Message;
use crate::sequencer::state::SharedState;
use crate::sequencer::{Sequencer, TurnReport, EXIT_KEYWORD};

pub mod commands;
pub mod input;

use commands::Command;
use input::InputSource;

pub const USER_PROMPT: &str = "\nYou: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The human typed the exit keyword.
    Exited,
    /// The input channel closed; treated as an exit.
    EndOfInput,
}

pub struct Session<W: Write> {
    id: Uuid,
    sequencer: Sequencer,
    state: SharedState,
    input: Box<dyn InputSource>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(
        sequencer: Sequencer,
        state: SharedState,
        input: Box<dyn InputSource>,
        out: W,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequencer,
            state,
            input,
            out,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self) -> Result<SessionEnd, AppError> {
        let span = info_span!("session", id = %self.id);
        self.drive().instrument(span).await
    }

    async fn drive(&mut self) -> Result<SessionEnd, AppError> {
        info!("Session started");

        loop {
            let line = match self.input.read_line(USER_PROMPT).await {
                Ok(line) => line,
                Err(e) => {
                    if self.skip_after_input_error(e)? {
                        continue;
                    }
                    None
                }
            };

            let (text, notes, end_of_input) = match line {
                Some(line) => {
                    let command = Command::parse(&line);
                    match commands::apply(command, &mut self.state, &mut *self.input).await {
                        Ok(notes) => (line, notes, false),
                        Err(e) => {
                            if self.skip_after_input_error(e)? {
                                continue;
                            }
                            self.end_of_input()?
                        }
                    }
                }
                None => self.end_of_input()?,
            };

            for note in &notes {
                writeln!(self.out, "[note] {}", note.content)?;
            }

            let report = self.sequencer.run_turn(&mut self.state, &text, notes).await;
            self.render(&report)?;

            if report.terminated {
                info!(messages = self.state.message_log.len(), "Session finished");
                return Ok(if end_of_input {
                    SessionEnd::EndOfInput
                } else {
                    SessionEnd::Exited
                });
            }
        }
    }

    /// Prints the failure. A bad line is skipped (`true`); any other input
    /// failure closes input so the closing summary still runs (`false`).
    fn skip_after_input_error(&mut self, e: AppError) -> Result<bool, AppError> {
        writeln!(self.out, "\n[error] {}", e.diagnostic())?;
        if let AppError::Input(_) = e {
            warn!(error = %e, "Skipping unreadable input line");
            return Ok(true);
        }
        error!(error = %e, "Input channel failed");
        Ok(false)
    }

    fn end_of_input(&mut self) -> Result<(String, Vec<Message>, bool), AppError> {
        writeln!(self.out, "\n(end of input)")?;
        Ok((EXIT_KEYWORD.to_string(), Vec::new(), true))
    }

    fn render(&mut self, report: &TurnReport) -> Result<(), AppError> {
        for message in &report.messages {
            writeln!(self.out, "\n{}", message.content)?;
        }
        for diagnostic in &report.diagnostics {
            writeln!(self.out, "\n[error] {diagnostic}")?;
        }
        if let Some(summary) = &report.summary {
            writeln!(self.out, "\n{summary}")?;
        }
        if report.terminated {
            writeln!(self.out, "\nGoodbye!")?;
        }
        self.out.flush()?;
        Ok(())
    }
}
