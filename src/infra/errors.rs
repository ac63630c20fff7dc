// src/infra/errors.rs — Error types for qarelay

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QaRelayError {
    // Endpoint errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid API key for '{provider}'. Check the {env_var} environment variable.")]
    Unauthorized { provider: String, env_var: String },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    #[error("Provider '{provider}' returned an empty response")]
    EmptyResponse { provider: String },

    // Setup errors
    #[error("Missing API key for '{endpoint}': set {env_var} or api_key in config")]
    MissingApiKey { endpoint: String, env_var: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // Infra
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
