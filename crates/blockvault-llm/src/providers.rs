//! LLM Provider implementations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

fn map_error_status(status: reqwest::StatusCode, body: String) -> LLMError {
    if status.as_u16() == 429 {
        LLMError::RateLimited {
            retry_after_seconds: 1,
        }
    } else {
        LLMError::RequestFailed {
            message: format!("HTTP {}: {}", status, body),
        }
    }
}

fn map_network_error(err: reqwest::Error) -> LLMError {
    LLMError::NetworkError {
        message: err.to_string(),
    }
}

// ============================================================================
// Gemini Provider (Default Primary)
// ============================================================================

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("BLOCKVAULT_GEMINI_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("BLOCKVAULT_GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
        }
    }
}

/// Google Gemini API provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(GeminiConfig::default())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if self.config.api_key.is_empty() {
            return Err(LLMError::ConfigurationError {
                message: "GEMINI_API_KEY is not set".to_string(),
            });
        }

        let contents = request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        MessageRole::Assistant => "model",
                        // Gemini has no system role inside contents
                        MessageRole::User | MessageRole::System => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system.as_ref().map(|s| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: s.clone() }],
        });

        let gemini_request = GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                response_mime_type: request
                    .json_mode
                    .then(|| "application/json".to_string()),
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let model = request.model.unwrap_or_else(|| self.config.model.clone());
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(map_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, body));
        }

        let gemini_response: GeminiResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let content = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        let usage = gemini_response.usage_metadata.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
            model: Some(model),
        })
    }
}

// ============================================================================
// Groq Provider (Default Fallback)
// ============================================================================

/// Configuration for the Groq provider
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("BLOCKVAULT_GROQ_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            model: std::env::var("BLOCKVAULT_GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
        }
    }
}

/// Groq hosted inference provider (OpenAI-compatible wire format)
pub struct GroqProvider {
    config: GroqConfig,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(config: GroqConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(GroqConfig::default())
    }
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChatChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChatChoice {
    message: OpenAIChatMessage,
}

#[derive(Deserialize, Default)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

fn to_openai_messages(request: &CompletionRequest) -> Vec<OpenAIChatMessage> {
    let mut messages: Vec<OpenAIChatMessage> = vec![];

    if let Some(ref system) = request.system {
        messages.push(OpenAIChatMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAIChatMessage {
            role: match msg.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            }
            .to_string(),
            content: msg.content.clone(),
        });
    }

    messages
}

async fn openai_compatible_complete(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    default_model: &str,
    request: CompletionRequest,
) -> Result<CompletionResponse> {
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| default_model.to_string());

    let chat_request = OpenAIChatRequest {
        model: model.clone(),
        messages: to_openai_messages(&request),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream: false,
        response_format: request
            .json_mode
            .then(|| serde_json::json!({"type": "json_object"})),
    };

    let url = format!("{}/chat/completions", base_url);
    let mut req = client.post(&url).json(&chat_request);
    if let Some(key) = api_key {
        req = req.bearer_auth(key);
    }

    let response = req.send().await.map_err(map_network_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(map_error_status(status, body));
    }

    let chat_response: OpenAIChatResponse =
        response.json().await.map_err(|e| LLMError::InvalidResponse {
            message: e.to_string(),
        })?;

    let content = chat_response
        .choices
        .first()
        .map(|c| c.message.content.clone())
        .unwrap_or_default();

    let usage = chat_response.usage.unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage: TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        },
        model: Some(model),
    })
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "Groq"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if self.config.api_key.is_empty() {
            return Err(LLMError::ConfigurationError {
                message: "GROQ_API_KEY is not set".to_string(),
            });
        }

        openai_compatible_complete(
            &self.client,
            &self.config.base_url,
            Some(&self.config.api_key),
            &self.config.model,
            request,
        )
        .await
    }
}

// ============================================================================
// OpenAI-Compatible Provider
// ============================================================================

/// Configuration for OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for OpenAICompatConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("BLOCKVAULT_OPENAI_COMPAT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
            api_key: std::env::var("BLOCKVAULT_OPENAI_COMPAT_API_KEY").ok(),
            model: std::env::var("BLOCKVAULT_OPENAI_COMPAT_MODEL")
                .unwrap_or_else(|_| "default".to_string()),
        }
    }
}

/// OpenAI-compatible API provider (vLLM, llama.cpp, etc.)
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(OpenAICompatConfig::default())
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    fn name(&self) -> &'static str {
        "OpenAI-Compatible"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAICompat
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.base_url);
        let mut req = self.client.get(&url);
        if let Some(ref key) = self.config.api_key {
            req = req.bearer_auth(key);
        }
        req.send().await.is_ok()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        openai_compatible_complete(
            &self.client,
            &self.config.base_url,
            self.config.api_key.as_deref(),
            &self.config.model,
            request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gemini_unavailable_without_key() {
        let provider = GeminiProvider::new(GeminiConfig {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
        });

        assert!(!provider.is_available().await);

        let request = CompletionRequest::new(vec![Message::user("hello")]);
        let result = provider.complete(request).await;
        assert!(matches!(result, Err(LLMError::ConfigurationError { .. })));
    }

    #[tokio::test]
    async fn test_groq_unavailable_without_key() {
        let provider = GroqProvider::new(GroqConfig {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
        });

        assert!(!provider.is_available().await);
    }

    #[test]
    fn test_system_message_goes_first() {
        let request = CompletionRequest::new(vec![Message::user("analyze")])
            .with_system("You are a risk analyst");

        let messages = to_openai_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }
}
