//! Model invocation as an explicit, ordered attempt sequence.
//!
//! The structured path is tried first. Any failure there (unsupported model,
//! transport error, no parsed value) moves on to the free-text path, whose
//! output goes through [`normalize`]. A failed free-text path ends the
//! invocation. Nothing is retried.

use serde_json::Value;
use std::future::Future;

use super::error::GenerationError;
use super::extract::normalize;
use super::prompt::Prompt;
use super::types::{GenerationRequest, ReasoningEffort};
use super::validate::output_schema;

/// Everything the model service needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCall {
    pub model: String,
    pub reasoning_effort: ReasoningEffort,
    pub system: String,
    pub user: String,
    /// Output schema requested on the structured path.
    pub schema: Value,
}

impl ModelCall {
    pub fn new(request: &GenerationRequest, prompt: Prompt) -> Self {
        Self {
            model: request.model().to_string(),
            reasoning_effort: request.reasoning_effort(),
            system: prompt.system.to_string(),
            user: prompt.user,
            schema: output_schema(),
        }
    }
}

/// The two call shapes offered by a model service.
///
/// Errors are plain messages; [`invoke`] decides what they mean.
pub trait ModelClient {
    /// Ask for output already conforming to `call.schema`.
    ///
    /// `Ok(None)` means the call went through but no parsed value came back.
    fn structured(
        &self,
        call: &ModelCall,
    ) -> impl Future<Output = Result<Option<Value>, String>> + Send;

    /// Ask for the JSON object as plain text.
    fn free_text(&self, call: &ModelCall) -> impl Future<Output = Result<String, String>> + Send;
}

/// Which protocol an attempt used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path {
    Structured,
    FreeText,
}

/// Attempts in the order they are tried.
pub const ATTEMPT_ORDER: [Path; 2] = [Path::Structured, Path::FreeText];

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// A parsed value is available; stop here.
    Parsed(Value),
    /// This path could not produce a value; try the next one.
    NeedsFallback(String),
    /// The invocation is over.
    Failed(GenerationError),
}

/// Classify the result of a structured call.
pub fn structured_outcome(result: Result<Option<Value>, String>) -> Attempt {
    match result {
        Ok(Some(value)) => Attempt::Parsed(value),
        Ok(None) => Attempt::NeedsFallback("structured call returned no parsed value".to_string()),
        Err(e) => Attempt::NeedsFallback(e),
    }
}

/// Classify the result of a free-text call, normalizing its text.
pub fn free_text_outcome(result: Result<String, String>) -> Attempt {
    match result {
        Err(e) => Attempt::Failed(GenerationError::ModelInvocation(e)),
        Ok(text) if text.trim().is_empty() => Attempt::Failed(GenerationError::ModelInvocation(
            "model returned empty output".to_string(),
        )),
        Ok(text) => match normalize(&text) {
            Ok(value) => Attempt::Parsed(value),
            Err(e) => Attempt::Failed(e),
        },
    }
}

async fn attempt<C: ModelClient>(client: &C, path: Path, call: &ModelCall) -> Attempt {
    match path {
        Path::Structured => structured_outcome(client.structured(call).await),
        Path::FreeText => free_text_outcome(client.free_text(call).await),
    }
}

/// Run the attempt sequence and return the first parsed value.
///
/// The caller cannot tell which path produced the value.
pub async fn invoke<C: ModelClient>(
    client: &C,
    call: &ModelCall,
) -> Result<Value, GenerationError> {
    let mut last_reason = String::from("no model call was attempted");

    for path in ATTEMPT_ORDER {
        match attempt(client, path, call).await {
            Attempt::Parsed(value) => {
                log::debug!("Model output obtained via {path:?} path");
                return Ok(value);
            }
            Attempt::NeedsFallback(reason) => {
                log::warn!("{path:?} model call unavailable, falling back: {reason}");
                last_reason = reason;
            }
            Attempt::Failed(e) => return Err(e),
        }
    }

    Err(GenerationError::ModelInvocation(last_reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeClient {
        structured: Result<Option<Value>, String>,
        free_text: Result<String, String>,
        structured_calls: AtomicUsize,
        free_text_calls: AtomicUsize,
    }

    impl FakeClient {
        fn new(
            structured: Result<Option<Value>, String>,
            free_text: Result<String, String>,
        ) -> Self {
            Self {
                structured,
                free_text,
                structured_calls: AtomicUsize::new(0),
                free_text_calls: AtomicUsize::new(0),
            }
        }
    }

    impl ModelClient for FakeClient {
        async fn structured(&self, _call: &ModelCall) -> Result<Option<Value>, String> {
            self.structured_calls.fetch_add(1, Ordering::SeqCst);
            self.structured.clone()
        }

        async fn free_text(&self, _call: &ModelCall) -> Result<String, String> {
            self.free_text_calls.fetch_add(1, Ordering::SeqCst);
            self.free_text.clone()
        }
    }

    fn call() -> ModelCall {
        ModelCall {
            model: "gpt-5".to_string(),
            reasoning_effort: ReasoningEffort::Minimal,
            system: "system".to_string(),
            user: "user".to_string(),
            schema: output_schema(),
        }
    }

    fn payload() -> Value {
        json!({ "files": [{ "path": "a", "content": "" }, { "path": "b", "content": "" }] })
    }

    #[tokio::test]
    async fn test_structured_path_short_circuits() {
        let client = FakeClient::new(Ok(Some(payload())), Err("unused".to_string()));

        assert_eq!(invoke(&client, &call()).await.unwrap(), payload());
        assert_eq!(client.structured_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.free_text_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_when_structured_unsupported() {
        let text = format!("```json\n{}\n```", payload());
        let client = FakeClient::new(Err("unsupported model".to_string()), Ok(text));

        assert_eq!(invoke(&client, &call()).await.unwrap(), payload());
        assert_eq!(client.free_text_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_falls_back_when_no_parsed_value() {
        let client = FakeClient::new(Ok(None), Ok(payload().to_string()));
        assert_eq!(invoke(&client, &call()).await.unwrap(), payload());
    }

    #[tokio::test]
    async fn test_both_paths_failing_is_invocation_error() {
        let client = FakeClient::new(
            Err("timeout".to_string()),
            Err("connection reset".to_string()),
        );

        assert_eq!(
            invoke(&client, &call()).await,
            Err(GenerationError::ModelInvocation("connection reset".to_string()))
        );
    }

    #[tokio::test]
    async fn test_empty_free_text_is_invocation_error() {
        let client = FakeClient::new(Ok(None), Ok("  \n".to_string()));
        assert!(matches!(
            invoke(&client, &call()).await,
            Err(GenerationError::ModelInvocation(_))
        ));
    }

    #[tokio::test]
    async fn test_prose_only_is_normalization_error() {
        let client = FakeClient::new(Ok(None), Ok("No JSON today.".to_string()));
        assert_eq!(
            invoke(&client, &call()).await,
            Err(GenerationError::Normalization {
                raw: "No JSON today.".to_string()
            })
        );
    }

    #[test]
    fn test_structured_outcome() {
        assert_eq!(
            structured_outcome(Ok(Some(json!({})))),
            Attempt::Parsed(json!({}))
        );
        assert!(matches!(
            structured_outcome(Err("400".to_string())),
            Attempt::NeedsFallback(reason) if reason == "400"
        ));
    }

    #[test]
    fn test_attempt_order() {
        assert_eq!(ATTEMPT_ORDER, [Path::Structured, Path::FreeText]);
    }
}
