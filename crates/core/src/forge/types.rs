use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::GenerationError;

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Reasoning depth hint forwarded to the model service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    #[default]
    Minimal,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "minimal",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(ReasoningEffort::Minimal),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(format!(
                "Invalid reasoning effort '{other}'. Expected one of: minimal, medium, high"
            )),
        }
    }
}

/// Inbound call shape shared by the HTTP route, the MCP tool and the CLI.
///
/// This is the loosely-typed form; [`GenerationArgs::into_request`] turns it
/// into a validated [`GenerationRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationArgs {
    #[serde(default)]
    pub agent_description: Option<String>,
    #[serde(default)]
    pub services: Option<serde_json::Value>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl GenerationArgs {
    pub fn into_request(self) -> Result<GenerationRequest, GenerationError> {
        let services = match self.services {
            None | Some(serde_json::Value::Null) => serde_json::Map::new(),
            Some(serde_json::Value::Object(map)) => map,
            Some(_) => {
                return Err(GenerationError::Input(
                    "services must be a JSON object".to_string(),
                ))
            }
        };

        GenerationRequest::new(
            self.agent_description.unwrap_or_default(),
            services,
            self.model,
            self.reasoning_effort.unwrap_or_default(),
        )
    }
}

/// A validated, immutable generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    agent_description: String,
    services: serde_json::Map<String, serde_json::Value>,
    model: String,
    reasoning_effort: ReasoningEffort,
}

impl GenerationRequest {
    /// Build a request, rejecting a missing or whitespace-only description.
    ///
    /// An empty or missing `model` falls back to [`DEFAULT_MODEL`].
    pub fn new(
        agent_description: impl Into<String>,
        services: serde_json::Map<String, serde_json::Value>,
        model: Option<String>,
        reasoning_effort: ReasoningEffort,
    ) -> Result<Self, GenerationError> {
        let agent_description = agent_description.into();
        if agent_description.trim().is_empty() {
            return Err(GenerationError::Input(
                "agentDescription is required".to_string(),
            ));
        }

        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            agent_description,
            services,
            model,
            reasoning_effort,
        })
    }

    pub fn agent_description(&self) -> &str {
        &self.agent_description
    }

    pub fn services(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.services
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn reasoning_effort(&self) -> ReasoningEffort {
        self.reasoning_effort
    }
}

/// One file produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Validated model output. Always holds at least two files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub files: Vec<GeneratedFile>,
}
