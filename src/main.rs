//! Demo MCP Server
//!
//! Serves the demo tools and prompts over stdio, or runs a single call from
//! the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use demo_mcp_server::config::Config;
use demo_mcp_server::dispatch::Dispatcher;
use demo_mcp_server::handlers::default_registry;
use demo_mcp_server::mcp::server::McpServer;

/// Demo MCP Server
#[derive(Parser)]
#[command(name = "demo-mcp-server")]
#[command(author, version, about = "Demo MCP Server - named tools and prompts over stdio")]
struct Cli {
    /// Server name advertised to clients
    #[arg(long, global = true)]
    name: Option<String>,

    /// Server version advertised to clients
    #[arg(long, global = true)]
    server_version: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (the default)
    Serve,

    /// Print the registered tools
    Tools,

    /// Print the registered prompts
    Prompts,

    /// Call a tool once and print the result
    Call {
        /// Tool name
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new()
        .and_then(|c| c.with_overrides(cli.name, cli.server_version))
        .context("failed to load configuration")?;

    let dispatcher = Dispatcher::new(default_registry(config.enable_prompts));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("MCP server starting");
            let mut server = McpServer::new(config, dispatcher);
            server.run_stdio().await.context("stdio server failed")?;
        }
        Commands::Tools => {
            for tool in dispatcher.registry().tools() {
                println!("{}: {}", tool.name, tool.description);
            }
        }
        Commands::Prompts => {
            for prompt in dispatcher.registry().prompts() {
                println!("{}: {}", prompt.name, prompt.description);
            }
        }
        Commands::Call { tool, args } => {
            let args: serde_json::Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;

            match dispatcher.call_tool(&tool, &args) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
