use mcpforge_core::forge::{GenerationArgs, GenerationError};

use super::{CallToolResult, Content, JsonRpcError};
use crate::error::Error;

fn tool_error(err: Error) -> JsonRpcError {
    let code = match err {
        Error::Generation(GenerationError::Input(_)) => -32602,
        _ => -32603,
    };

    JsonRpcError {
        code,
        message: format!("Tool execution error: {err}"),
        data: Some(serde_json::json!({ "kind": err.kind() })),
    }
}

pub async fn handle_generate_mcp_server(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: GenerationArgs =
        serde_json::from_value(arguments.unwrap_or(serde_json::Value::Null)).map_err(|e| {
            JsonRpcError {
                code: -32602,
                message: format!("Invalid arguments: {e}"),
                data: None,
            }
        })?;

    if global.verbose {
        let description = args.agent_description.as_deref().unwrap_or_default();
        anstream::eprintln!(
            "Calling generate_mcp_server: description='{}'",
            description.chars().take(50).collect::<String>()
        );
    }

    let result = crate::forge::generate_files_data(args, global)
        .await
        .map_err(tool_error)?;

    let json_string = serde_json::to_string_pretty(&result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Serialization error: {e}"),
        data: None,
    })?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> crate::Global {
        crate::Global {
            api_key: None,
            base_url: "http://127.0.0.1:9/v1".to_string(),
            timeout: Some(1),
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_missing_arguments_is_invalid_params() {
        let err = handle_generate_mcp_server(None, &global()).await.unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn test_bad_reasoning_effort_is_invalid_params() {
        let arguments = serde_json::json!({
            "agentDescription": "bot",
            "reasoningEffort": "extreme"
        });
        let err = handle_generate_mcp_server(Some(arguments), &global())
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
        assert!(err.message.starts_with("Invalid arguments"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_internal_error() {
        let arguments = serde_json::json!({ "agentDescription": "bot" });
        let err = handle_generate_mcp_server(Some(arguments), &global())
            .await
            .unwrap_err();
        assert_eq!(err.code, -32603);
        assert_eq!(err.data, Some(serde_json::json!({ "kind": "configuration" })));
    }
}
