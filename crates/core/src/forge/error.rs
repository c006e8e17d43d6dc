/// Terminal failures of the generation pipeline.
///
/// Every variant ends the current request. Nothing is retried internally and
/// no partial file list is ever returned alongside an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A required request field was missing or empty.
    #[error("Invalid request: {0}")]
    Input(String),

    /// Both the structured and the free-text model calls failed.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// The free-text output contained no extractable JSON object.
    #[error("Model output did not contain a JSON object")]
    Normalization { raw: String },

    /// The parsed JSON did not satisfy the output contract.
    #[error("Invalid model output: {0}")]
    Schema(String),

    /// A file could not be represented in the archive.
    #[error("Failed to package archive: {0}")]
    Packaging(String),
}

impl GenerationError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Input(_) => "input",
            GenerationError::ModelInvocation(_) => "model_invocation",
            GenerationError::Normalization { .. } => "normalization",
            GenerationError::Schema(_) => "schema",
            GenerationError::Packaging(_) => "packaging",
        }
    }
}
