pub mod openai;

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use mcpforge_core::forge::archive::check_entry_path;
use mcpforge_core::forge::{
    generate, missing_required_files, package, GenerationArgs, GenerationError, GenerationResult,
    ReasoningEffort, DEFAULT_MODEL,
};
use std::path::{Path, PathBuf};

use openai::OpenAiClient;

#[derive(Debug, clap::Parser)]
pub struct GenerateOptions {
    /// Natural-language description of the agent
    pub description: String,

    /// Services map as inline JSON, or @path to a JSON file
    #[clap(long)]
    pub services: Option<String>,

    /// Model name for generation
    #[clap(long, env = "MCPFORGE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Reasoning effort hint: minimal, medium or high
    #[clap(long, env = "MCPFORGE_REASONING_EFFORT", default_value = "minimal")]
    pub reasoning_effort: ReasoningEffort,

    /// Directory to write the generated files into
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Write the generated files as a zip archive to this path
    #[clap(long)]
    pub zip: Option<PathBuf>,

    /// Output as JSON
    #[clap(long)]
    pub json: bool,
}

/// Run the generation pipeline against the configured model service.
///
/// Input problems are reported before any client is created, so a missing
/// description never reaches the network.
pub async fn generate_files_data(
    args: GenerationArgs,
    global: &crate::Global,
) -> std::result::Result<GenerationResult, Error> {
    let request = args.into_request()?;
    let client = OpenAiClient::from_global(global)?;

    if global.verbose {
        eprintln!("Base URL: {}", global.base_url);
        eprintln!("Model: {}", request.model());
        eprintln!("Reasoning effort: {}", request.reasoning_effort());
    }

    let result = generate(&client, &request).await?;

    let missing = missing_required_files(result.files.iter().map(|file| file.path.as_str()));
    if !missing.is_empty() {
        log::warn!("Generated server is missing conventional files: {missing:?}");
    }

    Ok(result)
}

/// Parse the `--services` flag: inline JSON or `@path` to a JSON file.
pub async fn parse_services(raw: &str) -> Result<serde_json::Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read services file '{}': {}", path, e))?,
        None => raw.to_string(),
    };

    let value: serde_json::Value =
        serde_json::from_str(&text).context("Services must be valid JSON")?;

    if !value.is_object() {
        return Err(GenerationError::Input("services must be a JSON object".to_string()).into());
    }

    Ok(value)
}

/// Write every generated file below `dir`, refusing unsafe paths.
pub async fn write_files(result: &GenerationResult, dir: &Path) -> Result<()> {
    for file in &result.files {
        check_entry_path(&file.path).map_err(|e| eyre!("Refusing to write file: {}", e))?;
    }

    for file in &result.files {
        let target = dir.join(&file.path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create '{}': {}", parent.display(), e))?;
        }
        tokio::fs::write(&target, file.content.as_bytes())
            .await
            .map_err(|e| eyre!("Failed to write '{}': {}", target.display(), e))?;
    }

    Ok(())
}

pub async fn run(options: GenerateOptions, global: crate::Global) -> Result<()> {
    let services = match &options.services {
        Some(raw) => Some(parse_services(raw).await?),
        None => None,
    };

    let args = GenerationArgs {
        agent_description: Some(options.description.clone()),
        services,
        model: Some(options.model.clone()),
        reasoning_effort: Some(options.reasoning_effort),
    };

    let result = generate_files_data(args, &global).await?;

    if let Some(dir) = &options.output {
        write_files(&result, dir).await?;
    }

    if let Some(zip_path) = &options.zip {
        let archive = package(&result)?;
        tokio::fs::write(zip_path, archive.as_bytes())
            .await
            .map_err(|e| eyre!("Failed to write '{}': {}", zip_path.display(), e))?;

        if global.verbose {
            eprintln!("Archive size: {} bytes", archive.len());
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output_formatted(&result, &options);
    }

    Ok(())
}

fn output_formatted(result: &GenerationResult, options: &GenerateOptions) {
    println!(
        "\n{}\n",
        format!("Generated {} files", result.files.len()).green().bold()
    );

    let mut table = crate::prelude::new_table();
    table.add_row(prettytable::row!["Path", "Bytes"]);
    for file in &result.files {
        table.add_row(prettytable::row![file.path, file.content.len()]);
    }
    table.printstd();

    if let Some(dir) = &options.output {
        println!("\nWritten to {}", dir.display());
    }
    if let Some(zip_path) = &options.zip {
        println!("Archive written to {}", zip_path.display());
    }
    if options.output.is_none() && options.zip.is_none() {
        println!(
            "\n{}",
            "Use --output or --zip to save the files, or --json to print them.".dimmed()
        );
    }
}
