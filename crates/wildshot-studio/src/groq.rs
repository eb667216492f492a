//! Groq chat-completions client used to restate analyses as score records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wildshot_core::collaborators::ScoreFormatter;
use wildshot_core::error::DomainError;

use crate::error::StudioError;
use crate::{api_error, http_client};

const SERVICE: &str = "groq";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const CHAT_MODEL: &str = "llama-3.1-8b-instant";
const SCORE_RECORD_MAX_TOKENS: u32 = 128;

/// Builds the score-record request text.
#[must_use]
pub fn score_record_prompt(analysis: &str, score: u32) -> String {
    format!(
        "Here is an analysis of a photo: {analysis}. The score for this analysis is {score}. \
         Please return a JSON string in the following format: {{species: string, score: number}}"
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible Groq client.
pub struct GroqClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    /// Creates a client for the public API.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Network` if the HTTP client cannot be built.
    pub fn new(api_key: String) -> Result<Self, StudioError> {
        Ok(Self {
            http_client: http_client()?,
            api_key,
            base_url: GROQ_BASE_URL.to_owned(),
        })
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Runs a single-turn completion.
    ///
    /// An empty `system` prompt is omitted. With `json_mode` the model is
    /// constrained to emit a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a `StudioError` if the call fails or yields no content.
    pub async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        system: &str,
        json_mode: bool,
    ) -> Result<String, StudioError> {
        let request = chat_request(prompt, max_tokens, system, json_mode);
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(SERVICE, response).await);
        }
        let body: ChatResponse = response.json().await.map_err(|e| StudioError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })?;
        first_choice_content(body).ok_or_else(|| StudioError::Parse {
            service: SERVICE,
            detail: "no completion content".to_owned(),
        })
    }
}

#[async_trait]
impl ScoreFormatter for GroqClient {
    async fn format_score(&self, analysis: &str, score: u32) -> Result<String, DomainError> {
        let prompt = score_record_prompt(analysis, score);
        Ok(self
            .complete(&prompt, SCORE_RECORD_MAX_TOKENS, "", true)
            .await?)
    }
}

fn chat_request<'a>(
    prompt: &'a str,
    max_tokens: u32,
    system: &'a str,
    json_mode: bool,
) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !system.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt,
    });
    ChatRequest {
        model: CHAT_MODEL,
        messages,
        max_tokens,
        response_format: json_mode.then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

fn first_choice_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()?
        .message
        .content
        .filter(|c| !c.trim().is_empty())
}
