use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Serve JSON-RPC requests line by line until stdin closes.
pub async fn run_stdio(global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Starting mcpforge MCP server on stdio...");
    }

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let request = line.trim();

        if !request.is_empty() {
            log::debug!("Received: {request}");

            let response = super::handle_request(request, &global).await;
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');

            stdout.write_all(&payload).await?;
            stdout.flush().await?;
        }

        line.clear();
    }

    Ok(())
}
