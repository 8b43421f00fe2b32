//! Priority suggestions from a hosted language model.
//!
//! The prompt asks the model for a JSON object of the form
//! `{"suggestedPriority": "low" | "medium" | "high", "reasoning": "..."}`.
//! Anything else fails the call; there are no retries.

use crate::config::SuggestConfig;
use crate::types::Priority;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A suggested priority with the model's justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: Priority,
    pub reasoning: String,
}

/// Errors from a suggestion request.
#[derive(Debug)]
pub enum SuggestError {
    /// Nothing to suggest for.
    EmptyDescription,
    /// Transport failure or timeout.
    Http(reqwest::Error),
    /// Backend answered with a non-success status.
    Api { status: u16, body: String },
    /// Backend answered without any content.
    EmptyResponse,
    /// Content did not match the suggestion schema.
    Schema(serde_json::Error),
}

impl std::fmt::Display for SuggestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestError::EmptyDescription => write!(f, "task description is empty"),
            SuggestError::Http(e) => write!(f, "suggestion request failed: {}", e),
            SuggestError::Api { status, body } => write!(f, "suggestion backend error ({}): {}", status, body),
            SuggestError::EmptyResponse => write!(f, "suggestion backend returned no content"),
            SuggestError::Schema(e) => write!(f, "suggestion did not match schema: {}", e),
        }
    }
}

impl std::error::Error for SuggestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SuggestError::Http(e) => Some(e),
            SuggestError::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SuggestError {
    fn from(e: reqwest::Error) -> Self {
        SuggestError::Http(e)
    }
}

/// Anything that can propose a priority for a task description.
#[async_trait]
pub trait PrioritySuggester: Send + Sync {
    async fn suggest(&self, description: &str) -> Result<Suggestion, SuggestError>;
}

/// Build the prompt sent to the model.
pub fn build_prompt(description: &str) -> String {
    format!(
        "You are a task prioritization expert. Given the following task description, \
         suggest a priority level (low, medium, or high) and explain your reasoning.\n\n\
         Task Description: {}\n\n\
         Respond with only a JSON object of the form \
         {{\"suggestedPriority\": \"low\" | \"medium\" | \"high\", \"reasoning\": \"<one or two sentences>\"}}.",
        description.trim()
    )
}

/// Wire shape of the model's answer.
#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    #[serde(rename = "suggestedPriority")]
    suggested_priority: Priority,
    reasoning: String,
}

/// Parse the model's message content into a [`Suggestion`].
///
/// Accepts the object bare or inside a Markdown code fence.
pub fn parse_suggestion(content: &str) -> Result<Suggestion, SuggestError> {
    let body = strip_code_fence(content.trim());
    if body.is_empty() {
        return Err(SuggestError::EmptyResponse);
    }
    let payload: SuggestionPayload = serde_json::from_str(body).map_err(SuggestError::Schema)?;
    Ok(Suggestion {
        priority: payload.suggested_priority,
        reasoning: payload.reasoning.trim().to_string(),
    })
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop the info string ("json"), which ends at the first newline if there is one
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Suggester backed by an OpenAI-compatible chat completions endpoint.
pub struct LlmSuggester {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl LlmSuggester {
    pub fn new(config: &SuggestConfig) -> Result<Self, SuggestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PrioritySuggester for LlmSuggester {
    async fn suggest(&self, description: &str) -> Result<Suggestion, SuggestError> {
        if description.trim().is_empty() {
            return Err(SuggestError::EmptyDescription);
        }

        let prompt = build_prompt(description);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        log::info!("Requesting priority suggestion from {} ({})", url, self.model);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            log::warn!("Suggestion backend returned {}", status);
            return Err(SuggestError::Api { status, body });
        }

        let body = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&body).map_err(SuggestError::Schema)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SuggestError::EmptyResponse)?;

        let suggestion = parse_suggestion(&content)?;
        log::info!("Model suggested {} priority", suggestion.priority);
        Ok(suggestion)
    }
}
