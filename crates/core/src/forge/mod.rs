//! MCP server generation pipeline.
//!
//! Prompt construction, model invocation, output normalization, schema
//! validation and archive packaging. The only I/O boundary is the
//! [`ModelClient`] trait, implemented by the shell crate.

pub mod archive;
pub mod error;
pub mod extract;
pub mod invoke;
pub mod prompt;
pub mod types;
pub mod validate;

pub use archive::{package, Archive, ARCHIVE_FILENAME, ARCHIVE_MEDIA_TYPE};
pub use error::GenerationError;
pub use extract::normalize;
pub use invoke::{invoke, ModelCall, ModelClient};
pub use prompt::{build_prompt, missing_required_files, Prompt, REQUIRED_FILES};
pub use types::{
    GeneratedFile, GenerationArgs, GenerationRequest, GenerationResult, ReasoningEffort,
    DEFAULT_MODEL,
};
pub use validate::validate;

/// Run the pipeline: build the prompt, call the model, validate its output.
///
/// Either returns at least two files or one of the [`GenerationError`] kinds.
pub async fn generate<C: ModelClient>(
    client: &C,
    request: &GenerationRequest,
) -> Result<GenerationResult, GenerationError> {
    let call = ModelCall::new(request, build_prompt(request));
    let value = invoke(client, &call).await?;
    validate(&value)
}
