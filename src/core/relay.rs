// src/core/relay.rs — The question → answer → log loop
//
// Strictly sequential: one HTTP call in flight at a time, a fixed cooldown
// between iterations, and nothing but counters kept in memory.

use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::answer::Answerer;
use super::question::QuestionGenerator;
use super::transcript::{Interaction, Transcript};
use crate::infra::config::RelayConfig;
use crate::infra::errors::QaRelayError;

#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub cooldown: Duration,
    /// `None` runs until shutdown.
    pub max_rounds: Option<u64>,
}

impl From<&RelayConfig> for RelayOptions {
    fn from(config: &RelayConfig) -> Self {
        Self {
            cooldown: Duration::from_secs(config.cooldown_secs),
            max_rounds: config.max_rounds,
        }
    }
}

/// In-memory counters. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub rounds: u64,
    pub attempts: u64,
    pub logged: u64,
    pub question_failures: u64,
    pub answer_failures: u64,
    pub unexpected_errors: u64,
}

impl RelayStats {
    fn record(&mut self, outcome: &IterationOutcome) {
        self.attempts += 1;
        match outcome {
            IterationOutcome::Logged(_) => self.logged += 1,
            IterationOutcome::QuestionFailed(_) => self.question_failures += 1,
            IterationOutcome::AnswerFailed { .. } => self.answer_failures += 1,
            IterationOutcome::LogFailed(_) => self.unexpected_errors += 1,
        }
    }
}

/// What happened to one model's turn.
#[derive(Debug)]
pub enum IterationOutcome {
    Logged(Interaction),
    QuestionFailed(QaRelayError),
    AnswerFailed {
        question: String,
        error: QaRelayError,
    },
    LogFailed(QaRelayError),
}

pub struct Relay {
    questions: QuestionGenerator,
    answerer: Answerer,
    transcript: Transcript,
    options: RelayOptions,
    rng: StdRng,
}

impl Relay {
    pub fn new(
        questions: QuestionGenerator,
        answerer: Answerer,
        transcript: Transcript,
        options: RelayOptions,
    ) -> Self {
        Self {
            questions,
            answerer,
            transcript,
            options,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the entropy-seeded RNG (reproducible topic picks).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Run rounds until `max_rounds` or until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F) -> RelayStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = RelayStats::default();
        let models = self.answerer.models().to_vec();

        tracing::info!("Starting AI Question-Answer System...");
        tracing::info!("Question model: {}", self.questions.model());
        tracing::info!("Available answer models: {}", models.join(", "));
        tracing::info!("Cooldown period: {} seconds", self.options.cooldown.as_secs());
        tracing::info!("Logging to {}", self.transcript.path().display());

        if models.is_empty() {
            tracing::warn!("No answer models configured, nothing to do");
            return stats;
        }

        loop {
            if self.options.max_rounds.is_some_and(|max| stats.rounds >= max) {
                break;
            }
            let final_round = self.options.max_rounds == Some(stats.rounds + 1);

            for (i, model) in models.iter().enumerate() {
                let outcome = tokio::select! {
                    outcome = self.iterate(model) => outcome,
                    _ = &mut shutdown => {
                        tracing::info!("Stopping the system...");
                        return stats;
                    }
                };
                stats.record(&outcome);

                // Nothing follows the last iteration of a bounded run
                if final_round && i + 1 == models.len() {
                    break;
                }

                // Every outcome waits, a failed question included, so a dead
                // question endpoint cannot turn the loop into a busy spin.

                tracing::info!(
                    "Waiting {} seconds before next model...",
                    self.options.cooldown.as_secs()
                );
                tokio::select! {
                    _ = tokio::time::sleep(self.options.cooldown) => {}
                    _ = &mut shutdown => {
                        tracing::info!("Stopping the system...");
                        return stats;
                    }
                }
            }
            stats.rounds += 1;
        }

        tracing::info!(
            rounds = stats.rounds,
            logged = stats.logged,
            failures = stats.question_failures + stats.answer_failures,
            "Relay finished"
        );
        stats
    }

    /// One model's turn. Failures are logged and reported, never raised.
    pub async fn iterate(&mut self, model: &str) -> IterationOutcome {
        let question = match self.questions.generate(&mut self.rng).await {
            Ok(q) => q,
            Err(e) => {
                log_endpoint_error("question", &e);
                tracing::warn!("Failed to generate question for {model}, skipping...");
                return IterationOutcome::QuestionFailed(e);
            }
        };
        tracing::info!(model, "Question: {question}");

        let answer = match self.answerer.ask(model, &question).await {
            Ok(a) => a,
            Err(e) => {
                log_endpoint_error("answer", &e);
                tracing::warn!("Failed to get answer from {model}");
                return IterationOutcome::AnswerFailed { question, error: e };
            }
        };

        let interaction = Interaction::new(question, model, answer);
        match self.transcript.append(&interaction) {
            Ok(()) => IterationOutcome::Logged(interaction),
            Err(e) => {
                tracing::error!("Unexpected error: {e}");
                IterationOutcome::LogFailed(e)
            }
        }
    }

    /// A single exchange without cooldown. Errors propagate to the caller.
    ///
    /// When `question` is `None` a fresh one is generated first.
    pub async fn run_once(
        &mut self,
        model: &str,
        question: Option<String>,
    ) -> Result<Interaction, QaRelayError> {
        let question = match question {
            Some(q) => q,
            None => self.questions.generate(&mut self.rng).await?,
        };
        let answer = self.answerer.ask(model, &question).await?;
        let interaction = Interaction::new(question, model, answer);
        self.transcript.append(&interaction)?;
        Ok(interaction)
    }
}

fn log_endpoint_error(stage: &str, error: &QaRelayError) {
    match error {
        QaRelayError::Unauthorized { .. } => tracing::error!(stage, "{error}"),
        _ => tracing::warn!(stage, "{error}"),
    }
}
