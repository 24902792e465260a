//! CLI argument definitions for the ChemPredict client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ChemPredict: predict chemical reactions and chat with a chemistry assistant.
#[derive(Parser, Debug)]
#[command(name = "chempredict", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://127.0.0.1:8000.
    #[arg(short = 'u', long = "base-url")]
    pub base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one prediction and print the result.
    Predict {
        reactant1: String,
        reactant2: String,
        /// Use the model-backed predictor instead of the rule-based one.
        #[arg(long = "ml")]
        use_alternate_model: bool,
        /// Also write a report file.
        #[arg(long)]
        export: bool,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Send one message to the research assistant.
    Chat { message: String },
    /// Check that the backend is reachable.
    Health,
    /// Interactive session (default).
    Repl,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CHEMPREDICT_CONFIG env var > ~/.chempredict/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CHEMPREDICT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --base-url flag > CHEMPREDICT_BASE_URL env var > config file value.
    pub fn resolve_base_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.base_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("CHEMPREDICT_BASE_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_url.to_string()
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Repl)
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".chempredict").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".chempredict").join("config.toml");
    }
    PathBuf::from("config.toml")
}
