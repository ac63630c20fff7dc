// src/core/answer.rs — Relaying questions to the answer models

use std::sync::Arc;

use crate::infra::config::AnswerConfig;
use crate::infra::errors::QaRelayError;
use crate::provider::{ChatRequest, Message, ModelProvider};

pub struct Answerer {
    provider: Arc<dyn ModelProvider>,
    models: Vec<String>,
    system_prompt: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl Answerer {
    pub fn new(provider: Arc<dyn ModelProvider>, config: &AnswerConfig) -> Self {
        Self {
            provider,
            models: config.models.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Answer models in visiting order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn request_for(&self, model: &str, question: &str) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            system: Some(self.system_prompt.clone()),
            messages: vec![Message::user(question)],
            max_tokens: Some(self.max_tokens),
            temperature: self.temperature,
            top_p: None,
        }
    }

    pub async fn ask(&self, model: &str, question: &str) -> Result<String, QaRelayError> {
        let response = self.provider.chat(self.request_for(model, question)).await?;
        Ok(response.content)
    }
}
