// src/provider/openai_compat.rs — Generic OpenAI-compatible provider
//
// Used for both endpoints: the question API (Hyperbolic) and the answer API
// (Nous Research). Both speak POST {base_url}/chat/completions.

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatRequest, ChatResponse, Message, ModelProvider, TokenUsage};
use crate::infra::config::EndpointConfig;
use crate::infra::errors::QaRelayError;

/// Fallback wait reported for a 429 without a usable `retry-after` header.
const DEFAULT_RETRY_AFTER_MS: u64 = 5_000;

/// Provider for any OpenAI-compatible API endpoint.
pub struct OpenAICompatProvider {
    id_str: String,
    name_str: String,
    api_key: String,
    /// Named in the hint when the key is rejected.
    api_key_env: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        api_key: String,
        api_key_env: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, QaRelayError> {
        let id_str = id.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("qarelay/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QaRelayError::Provider {
                provider: id_str.clone(),
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            id_str,
            name_str: name.into(),
            api_key,
            api_key_env: api_key_env.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build a provider from config, resolving the API key up front.
    pub fn from_endpoint(
        endpoint: &EndpointConfig,
        display_name: &str,
    ) -> Result<Self, QaRelayError> {
        let api_key = endpoint.resolve_api_key()?;
        Self::new(
            endpoint.name.clone(),
            display_name,
            api_key,
            endpoint.api_key_env.clone(),
            endpoint.base_url.clone(),
            Duration::from_secs(endpoint.timeout_secs),
        )
    }
}

/// JSON payload for a chat completion. The system prompt, if any, goes first.
pub fn build_body(request: &ChatRequest) -> serde_json::Value {
    let mut msgs = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = &request.system {
        msgs.push(Message::system(system.clone()));
    }
    msgs.extend(request.messages.iter().cloned());

    let mut body = serde_json::json!({
        "model": request.model,
        "messages": msgs,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    if let Some(temp) = request.temperature {
        body["temperature"] = serde_json::json!(temp);
    }
    if let Some(top_p) = request.top_p {
        body["top_p"] = serde_json::json!(top_p);
    }
    body
}

/// Pull the first choice out of a completion body.
pub fn parse_response(
    provider: &str,
    resp: &serde_json::Value,
) -> Result<ChatResponse, QaRelayError> {
    let content = resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or("");

    if content.is_empty() {
        return Err(QaRelayError::EmptyResponse {
            provider: provider.to_string(),
        });
    }

    let usage = TokenUsage {
        input_tokens: resp["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: resp["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    };

    Ok(ChatResponse {
        content: content.to_string(),
        usage,
    })
}

fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| (secs * 1000.0) as u64)
        .unwrap_or(DEFAULT_RETRY_AFTER_MS)
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
    }

    fn name(&self) -> &str {
        &self.name_str
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, QaRelayError> {
        let body = build_body(&request);

        tracing::debug!(
            provider = %self.id_str,
            model = %request.model,
            "POST {}/chat/completions",
            self.base_url
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| QaRelayError::Provider {
                provider: self.id_str.clone(),
                message: if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(QaRelayError::Unauthorized {
                provider: self.id_str.clone(),
                env_var: self.api_key_env.clone(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(QaRelayError::RateLimited {
                provider: self.id_str.clone(),
                retry_after_ms: retry_after_ms(response.headers()),
            });
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(QaRelayError::Provider {
                provider: self.id_str.clone(),
                message: format!("HTTP {}: {}", status, error_body),
            });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| QaRelayError::Provider {
            provider: self.id_str.clone(),
            message: format!("Failed to parse response: {}", e),
        })?;

        let parsed = parse_response(&self.id_str, &resp)?;
        tracing::debug!(
            provider = %self.id_str,
            tokens = parsed.usage.total(),
            "completion received"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_body_system_first_and_sampling() {
        let req = ChatRequest {
            model: "m".into(),
            system: Some("be brief".into()),
            messages: vec![Message::user("why?")],
            max_tokens: Some(128),
            temperature: Some(0.5),
            top_p: Some(0.25),
        };
        let body = build_body(&req);
        assert_eq!(
            body,
            serde_json::json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "why?"},
                ],
                "max_tokens": 128,
                "temperature": 0.5,
                "top_p": 0.25,
            })
        );
    }

    #[test]
    fn test_build_body_omits_unset_params() {
        let req = ChatRequest {
            model: "m".into(),
            messages: vec![Message::user("q")],
            ..Default::default()
        };
        let body = build_body(&req);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
        assert!(body.get("top_p").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_response_trims() {
        let resp = serde_json::json!({
            "choices": [{"message": {"content": "  What is gravity?\n"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5},
        });
        let parsed = parse_response("hyperbolic", &resp).unwrap();
        assert_eq!(parsed.content, "What is gravity?");
        assert_eq!(parsed.usage.total(), 17);
    }

    #[test]
    fn test_parse_response_empty_choices() {
        let resp = serde_json::json!({"choices": []});
        assert!(matches!(
            parse_response("nous", &resp),
            Err(QaRelayError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn test_parse_response_blank_content() {
        let resp = serde_json::json!({"choices": [{"message": {"content": "   "}}]});
        assert!(matches!(
            parse_response("nous", &resp),
            Err(QaRelayError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(retry_after_ms(&headers), DEFAULT_RETRY_AFTER_MS);
        headers.insert(reqwest::header::RETRY_AFTER, "2.5".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), 2_500);
        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), DEFAULT_RETRY_AFTER_MS);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = OpenAICompatProvider::new(
            "nous",
            "Nous Research",
            "k".into(),
            "NOUS_API_KEY",
            "https://example.com/v1/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(p.base_url, "https://example.com/v1");
        assert_eq!(p.id(), "nous");
        assert_eq!(p.name(), "Nous Research");
    }
}
