// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::QaRelayError;
use crate::infra::paths;

/// Placeholder that every prompt template must contain.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

const DEFAULT_TOPICS: &[&str] = &[
    "physics",
    "history",
    "philosophy",
    "technology",
    "art",
    "daily life",
    "future predictions",
    "ethical dilemmas",
    "science fiction",
    "nature",
    "space",
    "health",
    "artificial intelligence",
    "climate change",
    "economics",
    "psychology",
    "mathematics",
    "literature",
    "music",
    "sports",
    "politics",
    "religion",
    "education",
];

const DEFAULT_PROMPTS: &[&str] = &[
    "Generate a short question about {topic}.",
    "Ask a simple question about {topic}.",
    "Create a brief question about {topic}.",
    "Formulate a quick question about {topic}.",
];

const DEFAULT_ANSWER_MODELS: &[&str] = &[
    "DeepHermes-3-Mistral-24B-Preview",
    "Hermes-3-Llama-3.1-70B",
    "DeepHermes-3-Llama-3-8B-Preview",
    "Hermes-3-Llama-3.1-405B",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub question: QuestionConfig,

    #[serde(default)]
    pub answer: AnswerConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

/// The endpoint that invents questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    pub base_url: String,
    /// Inline key; takes precedence over `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub system_prompt: String,
    pub topics: Vec<String>,
    pub prompts: Vec<String>,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.hyperbolic.xyz/v1".into(),
            api_key: None,
            api_key_env: "HYPERBOLIC_API_KEY".into(),
            timeout_secs: 10,
            model: "meta-llama/Meta-Llama-3.1-8B-Instruct".into(),
            max_tokens: 128,
            temperature: 0.9,
            top_p: 0.9,
            system_prompt: "You are a question generator. Generate very short questions.".into(),
            topics: DEFAULT_TOPICS.iter().map(|s| s.to_string()).collect(),
            prompts: DEFAULT_PROMPTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl QuestionConfig {
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            name: "hyperbolic".into(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            api_key_env: self.api_key_env.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// The endpoint hosting the models that answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Visited in order, one iteration each per round.
    pub models: Vec<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub system_prompt: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://inference-api.nousresearch.com/v1".into(),
            api_key: None,
            api_key_env: "NOUS_API_KEY".into(),
            timeout_secs: 60,
            models: DEFAULT_ANSWER_MODELS.iter().map(|s| s.to_string()).collect(),
            max_tokens: 256,
            temperature: None,
            system_prompt: "You are a helpful AI assistant. Answer briefly.".into(),
        }
    }
}

impl AnswerConfig {
    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            name: "nous".into(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            api_key_env: self.api_key_env.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub cooldown_secs: u64,
    pub log_file: PathBuf,
    /// Stop after this many rounds; run until interrupted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u64>,
    /// Print each logged entry to stdout as well.
    pub echo: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 30,
            log_file: PathBuf::from("interactions.log"),
            max_rounds: None,
            echo: true,
        }
    }
}

/// Connection settings shared by both endpoints.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl EndpointConfig {
    /// Inline key first, then the environment.
    pub fn resolve_api_key(&self) -> Result<String, QaRelayError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(QaRelayError::MissingApiKey {
                endpoint: self.name.clone(),
                env_var: self.api_key_env.clone(),
            }),
        }
    }

    fn validate(&self) -> Result<(), QaRelayError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            QaRelayError::Config(format!(
                "{}: invalid base_url '{}': {e}",
                self.name, self.base_url
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(QaRelayError::Config(format!(
                "{}: base_url must be http or https, got '{}'",
                self.name,
                parsed.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(QaRelayError::Config(format!(
                "{}: timeout_secs must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject configs the relay cannot run with.
    pub fn validate(&self) -> Result<(), QaRelayError> {
        self.question.endpoint().validate()?;
        self.answer.endpoint().validate()?;

        if self.question.model.trim().is_empty() {
            return Err(QaRelayError::Config("question.model is empty".into()));
        }
        if self.question.topics.is_empty() {
            return Err(QaRelayError::Config("question.topics is empty".into()));
        }
        if self.question.prompts.is_empty() {
            return Err(QaRelayError::Config("question.prompts is empty".into()));
        }
        if let Some(bad) = self
            .question
            .prompts
            .iter()
            .find(|p| !p.contains(TOPIC_PLACEHOLDER))
        {
            return Err(QaRelayError::Config(format!(
                "prompt template '{bad}' has no {TOPIC_PLACEHOLDER} placeholder"
            )));
        }
        if self.answer.models.is_empty() {
            return Err(QaRelayError::Config("answer.models is empty".into()));
        }
        if self.question.max_tokens == 0 || self.answer.max_tokens == 0 {
            return Err(QaRelayError::Config("max_tokens must be positive".into()));
        }
        Ok(())
    }

    /// The defaults rendered as a config file.
    pub fn example_toml() -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }
}
