// src/cli/inspect.rs — Read-only commands: models, example, validate

use crate::infra::config::Config;
use crate::infra::errors::QaRelayError;

pub fn show_models(config: &Config) {
    println!(
        "Question model: {} ({})",
        config.question.model, config.question.base_url
    );
    println!("Answer models ({}):", config.answer.base_url);
    for (i, model) in config.answer.models.iter().enumerate() {
        println!("  {}. {}", i + 1, model);
    }
}

pub fn show_example() -> anyhow::Result<()> {
    println!("# qarelay configuration file");
    println!("# API keys are read from the api_key_env variables unless api_key is set.");
    println!();
    print!("{}", Config::example_toml()?);
    Ok(())
}

/// Validation findings, one line each. Empty means ready to run.
pub fn check(config: &Config) -> Vec<String> {
    let mut problems = Vec::new();
    if let Err(e) = config.validate() {
        problems.push(e.to_string());
    }
    for endpoint in [config.question.endpoint(), config.answer.endpoint()] {
        if let Err(e @ QaRelayError::MissingApiKey { .. }) = endpoint.resolve_api_key() {
            problems.push(e.to_string());
        }
    }
    problems
}

pub fn run_validate(config: &Config) -> anyhow::Result<()> {
    let problems = check(config);
    if problems.is_empty() {
        println!("Configuration is valid");
        println!("  Question model: {}", config.question.model);
        println!("  Answer models:  {}", config.answer.models.len());
        println!("  Cooldown:       {}s", config.relay.cooldown_secs);
        println!("  Log file:       {}", config.relay.log_file.display());
        return Ok(());
    }
    for p in &problems {
        eprintln!("  - {p}");
    }
    anyhow::bail!("configuration has {} problem(s)", problems.len())
}
