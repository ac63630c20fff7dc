// src/main.rs — qarelay entry point

use clap::Parser;

use qarelay::cli::{Cli, Commands};
use qarelay::infra::config::Config;
use qarelay::infra::logger;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    cli.apply_overrides(&mut config);

    match &cli.command {
        None | Some(Commands::Run) => {
            qarelay::cli::run::run_relay(&config).await?;
        }
        Some(Commands::Ask { model, question }) => {
            let question = if question.is_empty() {
                None
            } else {
                Some(question.join(" "))
            };
            qarelay::cli::run::run_ask(&config, model.as_deref(), question).await?;
        }
        Some(Commands::Models) => qarelay::cli::inspect::show_models(&config),
        Some(Commands::Example) => qarelay::cli::inspect::show_example()?,
        Some(Commands::Validate) => qarelay::cli::inspect::run_validate(&config)?,
    }

    Ok(())
}
