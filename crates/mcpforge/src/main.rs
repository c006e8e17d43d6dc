use crate::prelude::*;
use clap::Parser;

mod error;
mod forge;
mod mcp;
mod prelude;
mod serve;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate MCP servers for an agent from a natural-language description"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// API key for the model service
    #[clap(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the OpenAI-compatible Responses API
    #[clap(
        long,
        env = "OPENAI_BASE_URL",
        global = true,
        default_value = "https://api.openai.com/v1"
    )]
    base_url: String,

    /// Request timeout in seconds for model calls (transport default when unset)
    #[clap(long, env = "MCPFORGE_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "MCPFORGE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate an MCP server from an agent description
    Generate(crate::forge::GenerateOptions),

    /// Serve the generation pipeline over HTTP
    Serve(crate::serve::ServeOptions),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Generate(options) => crate::forge::run(options, app.global).await,
        SubCommands::Serve(options) => crate::serve::run(options, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
