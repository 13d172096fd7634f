//! Core `AnswerService` trait and the chat-completions gateway client.
//!
//! `ApiAnswerService` talks to any OpenAI-compatible `/v1/chat/completions`
//! endpoint.  All connection details come from [`AnswerConfig`]; nothing is
//! hardcoded.  The service may rate-limit or fail transiently — the
//! conversational controller surfaces those as a spoken apology and never
//! caches a failed call.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AnswerConfig;
use crate::language::Language;

use super::history::{Message, Role};

// ---------------------------------------------------------------------------
// AnswerError
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching an answer.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// HTTP transport or connection error.
    #[error("answer request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("answer request timed out")]
    Timeout,

    /// The service rejected the call with HTTP 429.
    #[error("answering service rate limit exceeded")]
    RateLimited,

    /// Any other non-success status from the service.
    #[error("answering service error: HTTP {0}")]
    Service(u16),

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse answer response: {0}")]
    Parse(String),

    /// The service returned a response with no usable text content.
    #[error("answering service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AnswerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnswerError::Timeout
        } else {
            AnswerError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AnswerService trait
// ---------------------------------------------------------------------------

/// Async interface to the remote answering service.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn AnswerService>`.
///
/// # Arguments
/// * `question` – finalized capture transcript.
/// * `language` – language the answer must be written in.
/// * `history`  – recent conversation turns, oldest first.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        language: Language,
        history: &[Message],
    ) -> Result<String, AnswerError>;
}

// ---------------------------------------------------------------------------
// ApiAnswerService
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The system prompt carries the farming-assistant persona plus a
/// per-language response instruction, so answers come back in the language
/// the playback side will speak.
pub struct ApiAnswerService {
    client: reqwest::Client,
    config: AnswerConfig,
}

impl ApiAnswerService {
    /// Build a service client from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &AnswerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn language_instruction(language: Language) -> &'static str {
        match language {
            Language::English => "Respond in English. Use simple, farmer-friendly language.",
            Language::Hindi => {
                "Respond in Hindi (हिंदी). Use simple language that Indian farmers \
                 understand. Use Devanagari script."
            }
            Language::Marathi => {
                "Respond in Marathi (मराठी). Use simple language that Maharashtrian \
                 farmers understand. Use Devanagari script."
            }
            Language::Kannada => {
                "Respond in Kannada (ಕನ್ನಡ). Use simple language that Karnataka \
                 farmers understand. Use Kannada script."
            }
        }
    }

    fn system_prompt(language: Language) -> String {
        format!(
            "You are an agricultural assistant for Indian farmers.\n\
             \n\
             Your role:\n\
             - Help farmers with crop planning, pest control, soil management, \
             irrigation, and seasonal farming advice\n\
             - Provide practical, actionable advice that works for small-scale \
             Indian farming\n\
             - Consider local conditions in India (monsoons, Rabi/Kharif seasons, \
             common crops like wheat, rice, cotton, sugarcane)\n\
             - Always include preventive measures along with treatments\n\
             \n\
             Response style:\n\
             - Keep responses concise but complete (max 200 words unless a \
             detailed explanation is needed)\n\
             - The answer will be read aloud, so avoid tables and markup\n\
             - If unsure, recommend consulting the local Krishi Vigyan Kendra \
             (KVK) or agriculture officer\n\
             \n\
             {}",
            Self::language_instruction(language)
        )
    }

    fn build_messages(
        question: &str,
        language: Language,
        history: &[Message],
    ) -> Vec<serde_json::Value> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(serde_json::json!({
            "role": "system",
            "content": Self::system_prompt(language),
        }));
        for message in history {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(serde_json::json!({
                "role": role,
                "content": message.content,
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": question,
        }));
        messages
    }
}

#[async_trait]
impl AnswerService for ApiAnswerService {
    /// Send `question` (with recent history) to the configured endpoint.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty.
    async fn answer(
        &self,
        question: &str,
        language: Language,
        history: &[Message],
    ) -> Result<String, AnswerError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages":    Self::build_messages(question, language, history),
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens,
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AnswerError::RateLimited);
        }
        if !status.is_success() {
            return Err(AnswerError::Service(status.as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnswerError::Parse(e.to_string()))?;

        let answer = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(AnswerError::EmptyResponse)?
            .trim()
            .to_string();

        if answer.is_empty() {
            return Err(AnswerError::EmptyResponse);
        }

        Ok(answer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
