//! OpenAI Responses API client.
//!
//! Implements both call shapes of [`ModelClient`]: a structured request with
//! a strict `json_schema` text format, and a plain free-text request.

use mcpforge_core::forge::{ModelCall, ModelClient};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::Error;

/// Name attached to the requested JSON schema.
const SCHEMA_NAME: &str = "mcp_server_files";

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<u64>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent("mcpforge");
        if let Some(secs) = timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build a client from the global options. Fails when no API key is set.
    pub fn from_global(global: &crate::Global) -> Result<Self, Error> {
        let api_key = global
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingApiKey)?;

        Self::new(&global.base_url, api_key, global.timeout)
    }

    async fn send(&self, body: &Value) -> Result<Value, String> {
        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Model service returned {status}: {text}"));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("Failed to parse model response: {e}"))
    }
}

/// Request body for the Responses API.
///
/// With `structured` set, the body asks for strict output matching
/// `call.schema`.
pub fn request_body(call: &ModelCall, structured: bool) -> Value {
    let mut body = json!({
        "model": call.model,
        "instructions": call.system,
        "input": call.user,
        "reasoning": { "effort": call.reasoning_effort.as_str() },
    });

    if structured {
        body["text"] = json!({
            "format": {
                "type": "json_schema",
                "name": SCHEMA_NAME,
                "strict": true,
                "schema": call.schema,
            }
        });
    }

    body
}

/// Collect the text of a Responses API reply.
///
/// Prefers the top-level `output_text` field. Otherwise concatenates every
/// `output[].content[].text` fragment in order.
pub fn collect_output_text(response: &Value) -> Option<String> {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let fragments: Vec<&str> = response
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.concat())
    }
}

/// Extract an already-parsed value from a structured reply.
///
/// `output_parsed` wins when a gateway provides it; otherwise the reply text
/// must itself be a JSON object.
pub fn parsed_output(response: &Value) -> Option<Value> {
    if let Some(parsed) = response.get("output_parsed").filter(|v| v.is_object()) {
        return Some(parsed.clone());
    }

    let text = collect_output_text(response)?;
    serde_json::from_str::<Value>(&text)
        .ok()
        .filter(Value::is_object)
}

impl ModelClient for OpenAiClient {
    async fn structured(&self, call: &ModelCall) -> Result<Option<Value>, String> {
        let response = self.send(&request_body(call, true)).await?;
        Ok(parsed_output(&response))
    }

    async fn free_text(&self, call: &ModelCall) -> Result<String, String> {
        let response = self.send(&request_body(call, false)).await?;
        collect_output_text(&response).ok_or_else(|| "Model response contained no text".to_string())
    }
}
