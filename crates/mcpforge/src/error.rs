use mcpforge_core::forge::GenerationError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Missing API key: set OPENAI_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl Error {
    /// Machine-readable kind reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Generation(e) => e.kind(),
            Error::MissingApiKey | Error::Client(_) => "configuration",
        }
    }
}
