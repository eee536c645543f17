//! Client for the hosted text-generation API.
//!
//! One request per run, blocking, no retry or backoff: a transport or API
//! failure propagates and aborts the pipeline with whatever diagnostic the
//! HTTP layer produces.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::prompt::PromptPair;

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

/// Mild determinism bias, not greedy.
const TEMPERATURE: f64 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 100_000;

/// One-shot text generation seam. Production uses [`OpenAiClient`]; tests
/// script replies without touching the network.
pub trait ModelClient {
    /// Send the instruction pair and return the combined, trimmed reply text.
    fn generate(&self, model: &str, prompts: &PromptPair) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: Vec<Message<'a>>,
    temperature: f64,
    max_output_tokens: u32,
}

/// Blocking client for the responses endpoint.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            api_key,
            endpoint: RESPONSES_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (local stubs in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl ModelClient for OpenAiClient {
    fn generate(&self, model: &str, prompts: &PromptPair) -> Result<String> {
        let request = GenerationRequest {
            model,
            input: vec![
                Message {
                    role: "system",
                    content: &prompts.system,
                },
                Message {
                    role: "user",
                    content: &prompts.user,
                },
            ],
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        debug!(model, endpoint = %self.endpoint, "sending generation request");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .context("send generation request")?;

        let status = response.status();
        let body = response.text().context("read generation response")?;
        if !status.is_success() {
            return Err(anyhow!(
                "generation request failed with {status}: {body}"
            ));
        }

        // Prefer the joined output_text fragments; fall back to the raw body
        // when the expected shape is absent.
        let text = match serde_json::from_str::<Value>(&body) {
            Ok(value) => extract_output_text(&value).unwrap_or(body),
            Err(_) => body,
        };
        debug!(chars = text.len(), "model reply received");
        Ok(text.trim().to_string())
    }
}

/// Join every `output_text` fragment in the response, in order. `None` when
/// no such fragment exists.
fn extract_output_text(body: &Value) -> Option<String> {
    let output = body.get("output")?.as_array()?;
    let mut combined = String::new();
    for item in output {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            if part.get("type").and_then(Value::as_str) == Some("output_text")
                && let Some(text) = part.get("text").and_then(Value::as_str)
            {
                combined.push_str(text);
            }
        }
    }
    (!combined.is_empty()).then_some(combined)
}
