use super::types::GenerationRequest;

/// Files every generated server is expected to contain.
///
/// This is a convention communicated to the model. The validator only
/// enforces a minimum of two files.
pub const REQUIRED_FILES: [&str; 4] = [
    "server.py",
    "requirements.txt",
    "README.md",
    ".env.example",
];

/// Instructions sent with every generation request.
pub const SYSTEM_INSTRUCTIONS: &str = "\
You are an expert Python engineer who builds Model Context Protocol (MCP) servers.
You receive a description of an agent and a JSON map of the external services it uses.
You output the complete source of an MCP server implementing that agent.

Output contract:
- Produce exactly 4 files with these paths:
  - server.py: the MCP server entry point, exposing one tool per agent capability
  - requirements.txt: the pinned Python dependencies
  - README.md: setup and usage instructions
  - .env.example: every environment variable the server reads, with placeholder values
- Respond with a single JSON object of this exact shape:
  {\"files\": [{\"path\": \"server.py\", \"content\": \"...\"}, ...]}
- Every file has a string \"path\" and a string \"content\".
- Do not wrap the JSON in markdown fences. Do not add explanations or commentary.
- Never hardcode secrets. Read credentials from environment variables.";

/// The two prompt strings sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

/// Build the model prompt for a generation request.
///
/// The services map is rendered as pretty-printed JSON (`{}` when empty).
pub fn build_prompt(request: &GenerationRequest) -> Prompt {
    let services =
        serde_json::to_string_pretty(request.services()).unwrap_or_else(|_| "{}".to_string());

    let user = format!(
        "Agent description:\n{}\n\nServices:\n{}\n\nRespond with only the JSON object described in the instructions.",
        request.agent_description().trim(),
        services
    );

    Prompt {
        system: SYSTEM_INSTRUCTIONS,
        user,
    }
}

/// Conventional files absent from a generated file list.
pub fn missing_required_files<'a, I>(paths: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = paths.into_iter().collect();
    REQUIRED_FILES
        .iter()
        .copied()
        .filter(|required| !present.contains(required))
        .collect()
}
