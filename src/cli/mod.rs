// src/cli/mod.rs — CLI definition (clap derive)

pub mod inspect;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::infra::config::Config;

#[derive(Parser)]
#[command(
    name = "qarelay",
    about = "Generate random questions and relay them to a rotating set of models",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds to wait between iterations
    #[arg(long, global = true)]
    pub cooldown: Option<u64>,

    /// Interaction log file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Stop after this many rounds (one round visits every answer model)
    #[arg(long, global = true)]
    pub rounds: Option<u64>,

    /// Don't echo logged entries to stdout
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay loop (default)
    Run,
    /// Single exchange: generate (or take) a question, ask one model, log it
    Ask {
        /// Answer model (defaults to the first configured one)
        #[arg(short, long)]
        model: Option<String>,
        /// Question to ask instead of generating one
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// List the question model and the answer models
    Models,
    /// Print an example config.toml
    Example,
    /// Check config and API keys without calling any endpoint
    Validate,
}

impl Cli {
    /// Fold command-line overrides into the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(secs) = self.cooldown {
            config.relay.cooldown_secs = secs;
        }
        if let Some(ref path) = self.log_file {
            config.relay.log_file = path.clone();
        }
        if let Some(rounds) = self.rounds {
            config.relay.max_rounds = Some(rounds);
        }
        if self.quiet {
            config.relay.echo = false;
        }
    }
}
