// src/core/question.rs — Random question generation

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::infra::config::{QuestionConfig, TOPIC_PLACEHOLDER};
use crate::infra::errors::QaRelayError;
use crate::provider::{ChatRequest, Message, ModelProvider};

/// A topic and the user prompt built around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub topic: String,
    pub prompt: String,
}

/// Asks the question endpoint to invent a short question on a random topic.
pub struct QuestionGenerator {
    provider: Arc<dyn ModelProvider>,
    model: String,
    system_prompt: String,
    topics: Vec<String>,
    templates: Vec<String>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, config: &QuestionConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            topics: config.topics.clone(),
            templates: config.prompts.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Pick a topic, then a template, independently and uniformly.
    pub fn pick_prompt<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<QuestionPrompt, QaRelayError> {
        let topic = self
            .topics
            .choose(rng)
            .ok_or_else(|| QaRelayError::Config("no question topics configured".into()))?;
        let template = self
            .templates
            .choose(rng)
            .ok_or_else(|| QaRelayError::Config("no question prompts configured".into()))?;

        Ok(QuestionPrompt {
            topic: topic.clone(),
            prompt: template.replace(TOPIC_PLACEHOLDER, topic),
        })
    }

    pub fn request_for(&self, prompt: &QuestionPrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            system: Some(self.system_prompt.clone()),
            messages: vec![Message::user(prompt.prompt.clone())],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
        }
    }

    /// One fresh question, trimmed.
    pub async fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, QaRelayError> {
        let prompt = self.pick_prompt(rng)?;
        tracing::debug!(topic = %prompt.topic, "requesting question: {}", prompt.prompt);

        let response = self.provider.chat(self.request_for(&prompt)).await?;
        Ok(response.content)
    }
}
