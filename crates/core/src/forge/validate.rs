use serde_json::Value;

use super::error::GenerationError;
use super::types::{GeneratedFile, GenerationResult};

/// Minimum number of well-formed files a result must contain.
pub const MIN_FILES: usize = 2;

const INVALID_FILES: &str = "missing or invalid files array";

/// JSON schema describing the output contract, sent on the structured path.
///
/// The minimum file count is not expressed here; [`validate`] enforces it.
pub fn output_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "files": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string" },
                        "content": { "type": "string" }
                    },
                    "required": ["path", "content"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["files"],
        "additionalProperties": false
    })
}

fn file_from_value(value: &Value) -> Option<GeneratedFile> {
    let object = value.as_object()?;
    let path = object.get("path")?.as_str()?;
    let content = object.get("content")?.as_str()?;

    Some(GeneratedFile {
        path: path.to_string(),
        content: content.to_string(),
    })
}

/// Convert untyped model output into a [`GenerationResult`].
///
/// Malformed entries are dropped one by one; the result is rejected only
/// when fewer than [`MIN_FILES`] well-formed entries remain. Relative order
/// is preserved and duplicate paths are passed through.
pub fn validate(value: &Value) -> Result<GenerationResult, GenerationError> {
    let entries = value
        .get("files")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::Schema(INVALID_FILES.to_string()))?;

    let mut files = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match file_from_value(entry) {
            Some(file) => files.push(file),
            None => log::debug!("Dropping malformed file entry at index {index}"),
        }
    }

    if files.len() < MIN_FILES {
        return Err(GenerationError::Schema(INVALID_FILES.to_string()));
    }

    Ok(GenerationResult { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_valid_payload() {
        let value = json!({
            "files": [
                { "path": "server.py", "content": "import os" },
                { "path": ".env.example", "content": "" }
            ]
        });

        let result = validate(&value).unwrap();
        assert_eq!(
            result.files,
            vec![file("server.py", "import os"), file(".env.example", "")]
        );
    }

    #[test]
    fn test_idempotent_on_valid_result() {
        let original = GenerationResult {
            files: vec![file("a.py", "1"), file("b.py", "2"), file("a.py", "3")],
        };
        let value = serde_json::to_value(&original).unwrap();

        assert_eq!(validate(&value).unwrap(), original);
    }

    #[test]
    fn test_filters_malformed_entries_in_order() {
        let value = json!({
            "files": [
                { "path": "one.py", "content": "1" },
                { "path": "missing-content.py" },
                "not an object",
                { "path": 42, "content": "x" },
                { "path": "two.py", "content": "2", "extra": true },
                { "path": "null.py", "content": null },
                { "path": "three.py", "content": "3" }
            ]
        });

        let result = validate(&value).unwrap();
        assert_eq!(
            result.files,
            vec![file("one.py", "1"), file("two.py", "2"), file("three.py", "3")]
        );
    }

    #[test]
    fn test_single_file_fails() {
        let value = json!({ "files": [{ "path": "server.py", "content": "" }] });
        assert_eq!(
            validate(&value),
            Err(GenerationError::Schema(INVALID_FILES.to_string()))
        );
    }

    #[test]
    fn test_two_files_succeed() {
        let value = json!({
            "files": [
                { "path": "server.py", "content": "" },
                { "path": "README.md", "content": "" }
            ]
        });
        assert_eq!(validate(&value).unwrap().files.len(), 2);
    }

    #[test]
    fn test_filtering_below_minimum_fails() {
        let value = json!({
            "files": [
                { "path": "server.py", "content": "" },
                { "path": "README.md" }
            ]
        });
        assert!(matches!(validate(&value), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn test_structurally_broken_payloads() {
        for value in [
            json!(null),
            json!([]),
            json!("files"),
            json!({}),
            json!({ "files": "server.py" }),
            json!({ "files": { "path": "a", "content": "b" } }),
        ] {
            assert!(
                matches!(validate(&value), Err(GenerationError::Schema(_))),
                "expected schema error for {value}"
            );
        }
    }

    #[test]
    fn test_no_upper_bound() {
        let files: Vec<_> = (0..50)
            .map(|i| json!({ "path": format!("f{i}.py"), "content": "" }))
            .collect();
        let result = validate(&json!({ "files": files })).unwrap();
        assert_eq!(result.files.len(), 50);
    }

    #[test]
    fn test_output_schema_shape() {
        let schema = output_schema();
        assert_eq!(schema["required"], json!(["files"]));
        assert_eq!(schema["properties"]["files"]["type"], json!("array"));
        assert_eq!(
            schema["properties"]["files"]["items"]["required"],
            json!(["path", "content"])
        );
    }
}
