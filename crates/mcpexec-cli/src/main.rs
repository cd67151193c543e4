//! Command-line harness for the mcpexec runtime.
//!
//! Initializes the client manager from a JSON config file, runs one command
//! (list tools, or call a single tool), cleans up all connections, and maps
//! the outcome to process exit codes: 0 success, 1 failure, 130 interrupted.

use clap::{Parser, Subcommand};
use mcpexec_client::McpClientManager;
use mcpexec_core::{McpExecError, McpExecResult};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcpexec", about = "mcpexec — run MCP tools from the command line")]
struct Cli {
    /// Path to the MCP server configuration file
    #[arg(short, long, default_value = "mcp_config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tools from all enabled servers
    Tools,
    /// Invoke a single tool and print its unwrapped result as JSON
    Call {
        /// Tool identifier in the form serverName__toolName
        identifier: String,
        /// JSON object of tool parameters
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
}

const EXIT_FAILURE: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for tool results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let manager = McpClientManager::new();

    if let Err(e) = manager.initialize(&cli.config).await {
        error!(error = %e, "Failed to initialize MCP client manager");
        std::process::exit(EXIT_FAILURE);
    }
    info!("MCP client manager initialized");

    let mut exit_code = 0;
    tokio::select! {
        result = run(&cli.command, &manager) => {
            if let Err(e) = result {
                error!(error = %e, "Execution failed");
                exit_code = EXIT_FAILURE;
            }
        }
        _ = shutdown_signal() => {
            info!("Received termination signal, shutting down");
            exit_code = EXIT_INTERRUPTED;
        }
    }

    manager.cleanup().await;
    std::process::exit(exit_code);
}

async fn run(command: &Commands, manager: &McpClientManager) -> McpExecResult<()> {
    match command {
        Commands::Tools => {
            let tools = manager.list_all_tools().await?;
            if tools.is_empty() {
                println!("No tools available.");
                return Ok(());
            }
            for tool in &tools {
                match &tool.description {
                    Some(desc) => println!("{} — {desc}", tool.name),
                    None => println!("{}", tool.name),
                }
            }
            println!("\nTotal: {} tool(s)", tools.len());
        }
        Commands::Call { identifier, params } => {
            let params: serde_json::Value = serde_json::from_str(params)
                .map_err(|e| McpExecError::Configuration(format!("invalid --params JSON: {e}")))?;
            let result = manager.invoke(identifier, params).await?;
            match serde_json::to_string_pretty(&result) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{result}"),
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
