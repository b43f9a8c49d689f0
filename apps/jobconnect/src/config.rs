use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which "who runs next" policy the session is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Strict job pipeline, steps picked by position.
    Pipeline,
    /// Persona debate, next speaker picked by the coordinator.
    Debate,
}

impl Mode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pipeline" => Ok(Mode::Pipeline),
            "debate" => Ok(Mode::Debate),
            other => bail!("JOBCONNECT_MODE must be 'pipeline' or 'debate', got '{other}'"),
        }
    }

    fn default_turn_budget(self) -> u32 {
        match self {
            Mode::Pipeline => 8,
            Mode::Debate => 3,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Only malformed values are fatal; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub mode: Mode,
    pub turn_budget: u32,
    pub carry_history: bool,
    pub step_timeout: Duration,
    pub lookup_timeout: Duration,
    pub llm_timeout: Duration,
    pub wikipedia_api_url: String,
    pub job_listings_path: Option<String>,
    pub demo_seed: Option<u64>,
    pub rust_log: String,
}

pub const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match get("JOBCONNECT_MODE") {
            Some(raw) => Mode::parse(&raw)?,
            None => Mode::Pipeline,
        };

        Ok(Config {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            mode,
            turn_budget: match get("TURN_BUDGET") {
                Some(raw) => parse_budget(&raw)?,
                None => mode.default_turn_budget(),
            },
            carry_history: match get("CARRY_HISTORY") {
                Some(raw) => parse_bool("CARRY_HISTORY", &raw)?,
                None => true,
            },
            step_timeout: parse_secs(get("STEP_TIMEOUT_SECS"), "STEP_TIMEOUT_SECS", 30)?,
            lookup_timeout: parse_secs(get("LOOKUP_TIMEOUT_SECS"), "LOOKUP_TIMEOUT_SECS", 5)?,
            llm_timeout: parse_secs(get("LLM_TIMEOUT_SECS"), "LLM_TIMEOUT_SECS", 60)?,
            wikipedia_api_url: get("WIKIPEDIA_API_URL")
                .unwrap_or_else(|| DEFAULT_WIKIPEDIA_API_URL.to_string()),
            job_listings_path: get("JOB_LISTINGS_PATH"),
            demo_seed: get("DEMO_SEED")
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .context("DEMO_SEED must be an unsigned integer")
                })
                .transpose()?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_budget(raw: &str) -> Result<u32> {
    let budget = raw
        .trim()
        .parse::<u32>()
        .context("TURN_BUDGET must be a positive integer")?;
    if budget == 0 {
        bail!("TURN_BUDGET must be at least 1");
    }
    Ok(budget)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got '{other}'"),
    }
}

fn parse_secs(raw: Option<String>, key: &str, default: u64) -> Result<Duration> {
    let secs = match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a number of seconds"))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_any_variables() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.mode, Mode::Pipeline);
        assert_eq!(config.turn_budget, 8);
        assert!(config.carry_history);
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.step_timeout, Duration::from_secs(30));
        assert_eq!(config.lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.wikipedia_api_url, DEFAULT_WIKIPEDIA_API_URL);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_debate_mode_defaults_to_three_turns() {
        let config = config_from(&[("JOBCONNECT_MODE", "Debate")]).unwrap();
        assert_eq!(config.mode, Mode::Debate);
        assert_eq!(config.turn_budget, 3);
    }

    #[test]
    fn test_explicit_budget_overrides_mode_default() {
        let config = config_from(&[("JOBCONNECT_MODE", "debate"), ("TURN_BUDGET", "5")]).unwrap();
        assert_eq!(config.turn_budget, 5);
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        assert!(config_from(&[("TURN_BUDGET", "0")]).is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = config_from(&[("JOBCONNECT_MODE", "swarm")]).unwrap_err();
        assert!(err.to_string().contains("swarm"));
    }

    #[test]
    fn test_carry_history_accepts_common_spellings() {
        assert!(!config_from(&[("CARRY_HISTORY", "off")]).unwrap().carry_history);
        assert!(config_from(&[("CARRY_HISTORY", "YES")]).unwrap().carry_history);
        assert!(config_from(&[("CARRY_HISTORY", "maybe")]).is_err());
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "   ")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_demo_seed_must_be_numeric() {
        assert_eq!(config_from(&[("DEMO_SEED", "42")]).unwrap().demo_seed, Some(42));
        assert!(config_from(&[("DEMO_SEED", "abc")]).is_err());
    }
}
