mod config;
mod debate;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod sequencer;
mod session;
mod state;
mod summary;
mod tools;

use anyhow::Result;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, Mode};
use crate::sequencer::EXIT_KEYWORD;
use crate::session::input::StdinInput;
use crate::session::{Session, SessionEnd};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values stop here
    let config = Config::from_env()?;

    // Initialize structured logging (stderr, so it never interleaves with the conversation)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting JobConnect v{}", env!("CARGO_PKG_VERSION"));
    info!(mode = ?config.mode, turn_budget = config.turn_budget, "Configuration loaded");

    // Build collaborators
    let app = AppState::from_config(config)?;
    let sequencer = app.build_sequencer()?;
    let (state, scenario) = app.initial_state();

    match app.config.mode {
        Mode::Pipeline => println!("=== SINGAPORE JOB SEARCH DEMO ==="),
        Mode::Debate => println!("=== ETHICS BOARD: CAPITAL PUNISHMENT ==="),
    }
    println!("Type '{EXIT_KEYWORD}' to end.");
    if app.config.mode == Mode::Pipeline {
        println!("Commands: upload <path>, prefs, search, show.");
    }
    if let Some(scenario) = scenario {
        println!("\n[DEMO] Using scenario:");
        println!("       Resume: {}", scenario.resume_text);
        println!("       Query : {}", scenario.job_query);
    }

    let mut session = Session::new(
        sequencer,
        state,
        Box::new(StdinInput::spawn()?),
        std::io::stdout(),
    );

    tokio::select! {
        outcome = session.run() => match outcome? {
            SessionEnd::Exited => info!("Session ended by user"),
            SessionEnd::EndOfInput => info!("Session ended at end of input"),
        },
        _ = signal::ctrl_c() => {
            warn!("Interrupted");
            println!("\n\nConversation interrupted. Goodbye!");
        }
    }

    Ok(())
}
