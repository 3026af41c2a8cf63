//! Text-generation client boundary.
//!
//! The kernel emits a plain-text scene prompt; this module sends it to a
//! chat-completions-style endpoint and returns the completion text. Failures
//! are surfaced to the caller as an inline error string, never raised — the
//! feature degrades, the simulation keeps going.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub enum NarratorError {
    Http(reqwest::Error),
    UnexpectedShape(String),
}

impl fmt::Display for NarratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "narrator http error: {err}"),
            Self::UnexpectedShape(detail) => {
                write!(f, "narrator returned an unexpected shape: {detail}")
            }
        }
    }
}

impl std::error::Error for NarratorError {}

impl From<reqwest::Error> for NarratorError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// The inline string callers receive when the backend fails.
pub fn inline_failure(err: &NarratorError) -> String {
    format!("[narrator unavailable: {err}]")
}

#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, NarratorError>;
}

// ---------------------------------------------------------------------------
// HttpNarrator
// ---------------------------------------------------------------------------

/// Speaks the chat-completions JSON envelope against a local or remote
/// endpoint, with a request timeout and bounded retry on transient failures.
pub struct HttpNarrator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl HttpNarrator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.8,
        }
    }

    /// Endpoint/model from `TOWN_NARRATOR_ENDPOINT` / `TOWN_NARRATOR_MODEL`,
    /// defaulting to a local server.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("TOWN_NARRATOR_ENDPOINT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "http://127.0.0.1:11434/v1/chat/completions".to_string());
        let model = std::env::var("TOWN_NARRATOR_MODEL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "local".to_string());
        Self::new(endpoint, model)
    }
}

#[async_trait]
impl NarrativeBackend for HttpNarrator {
    async fn complete(&self, prompt: &str) -> Result<String, NarratorError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
        });

        let mut last_error: Option<NarratorError> = None;
        for attempt in 0..MAX_RETRIES {
            let response = self
                .client
                .post(&self.endpoint)
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .json(&body)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let value: Value = resp.json().await?;
                        return extract_completion(&value);
                    }

                    let transient = status.is_server_error() || status.as_u16() == 429;
                    let err = NarratorError::UnexpectedShape(format!("http status {status}"));
                    if !transient || attempt == MAX_RETRIES - 1 {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
                Err(err) => {
                    let transient = err.is_timeout() || err.is_connect();
                    if !transient || attempt == MAX_RETRIES - 1 {
                        return Err(err.into());
                    }
                    last_error = Some(err.into());
                }
            }

            tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt + 1))).await;
        }

        Err(last_error
            .unwrap_or_else(|| NarratorError::UnexpectedShape("retries exhausted".to_string())))
    }
}

fn extract_completion(value: &Value) -> Result<String, NarratorError> {
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            NarratorError::UnexpectedShape(
                "missing choices[0].message.content".to_string(),
            )
        })
}

// ---------------------------------------------------------------------------
// ScriptedNarrator
// ---------------------------------------------------------------------------

/// Offline backend returning a canned line; used by tests and by the CLI
/// when no endpoint is configured.
pub struct ScriptedNarrator {
    reply: String,
}

impl ScriptedNarrator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl NarrativeBackend for ScriptedNarrator {
    async fn complete(&self, _prompt: &str) -> Result<String, NarratorError> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_chat_completion_content() {
        let value = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Morning to you too.  " } }
            ]
        });
        assert_eq!(
            extract_completion(&value).expect("content"),
            "Morning to you too."
        );
    }

    #[test]
    fn unexpected_shape_is_an_error() {
        let value = json!({ "unexpected": true });
        let err = extract_completion(&value).unwrap_err();
        assert!(matches!(err, NarratorError::UnexpectedShape(_)));
    }

    #[test]
    fn inline_failure_is_a_plain_string() {
        let err = NarratorError::UnexpectedShape("http status 500".to_string());
        let inline = inline_failure(&err);
        assert!(inline.starts_with("[narrator unavailable:"));
    }

    #[tokio::test]
    async fn scripted_narrator_replies() {
        let narrator = ScriptedNarrator::new("canned line");
        let reply = narrator.complete("whatever").await.expect("reply");
        assert_eq!(reply, "canned line");
    }
}
