// src/cli/run.rs — Wiring config to the relay: `run` and `ask`

use std::sync::Arc;

use crate::core::answer::Answerer;
use crate::core::question::QuestionGenerator;
use crate::core::relay::{Relay, RelayOptions, RelayStats};
use crate::core::transcript::Transcript;
use crate::infra::config::Config;
use crate::provider::openai_compat::OpenAICompatProvider;
use crate::provider::ModelProvider;

/// Build both providers from config. Fails if either API key is missing.
pub fn build_providers(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ModelProvider>, Arc<dyn ModelProvider>)> {
    let question: Arc<dyn ModelProvider> = Arc::new(OpenAICompatProvider::from_endpoint(
        &config.question.endpoint(),
        "Hyperbolic",
    )?);
    let answer: Arc<dyn ModelProvider> = Arc::new(OpenAICompatProvider::from_endpoint(
        &config.answer.endpoint(),
        "Nous Research",
    )?);
    Ok((question, answer))
}

pub fn build_relay(
    config: &Config,
    question_provider: Arc<dyn ModelProvider>,
    answer_provider: Arc<dyn ModelProvider>,
) -> Relay {
    Relay::new(
        QuestionGenerator::new(question_provider, &config.question),
        Answerer::new(answer_provider, &config.answer),
        Transcript::new(config.relay.log_file.clone(), config.relay.echo),
        RelayOptions::from(&config.relay),
    )
}

/// Run the loop until the round limit or Ctrl+C.
pub async fn run_relay(config: &Config) -> anyhow::Result<RelayStats> {
    config.validate()?;
    let (question, answer) = build_providers(config)?;
    let mut relay = build_relay(config, question, answer);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let stats = relay.run(shutdown).await;
    eprintln!(
        "[done] rounds={} attempts={} logged={} question_failures={} answer_failures={} errors={}",
        stats.rounds,
        stats.attempts,
        stats.logged,
        stats.question_failures,
        stats.answer_failures,
        stats.unexpected_errors,
    );
    Ok(stats)
}

/// One exchange with a chosen (or the first) answer model.
pub async fn run_ask(
    config: &Config,
    model: Option<&str>,
    question: Option<String>,
) -> anyhow::Result<()> {
    config.validate()?;
    let model = match model {
        Some(m) => m.to_string(),
        None => config
            .answer
            .models
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no answer models configured"))?,
    };
    if !config.answer.models.contains(&model) {
        tracing::warn!("'{model}' is not in the configured answer models, asking anyway");
    }

    let (question_provider, answer_provider) = build_providers(config)?;
    let mut relay = build_relay(config, question_provider, answer_provider);
    let interaction = relay.run_once(&model, question).await?;

    if !config.relay.echo {
        println!("{}", interaction.answer);
    }
    Ok(())
}
