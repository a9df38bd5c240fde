//! `logistics` command-line harness
//!
//! Reads credentials from `.env` and `.env.credentials`, then either checks
//! the environment, lists tools, runs one tool, or runs the live smoke test.

mod smoke;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logistics_core::{Connections, EnvReport, ToolContext, ToolInvocation};
use logistics_tools::workshop_registry;
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logistics")]
#[command(about = "Production logistics tools for Notion, Airtable and Slack", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate required environment variables
    CheckEnv,
    /// Print every tool schema as JSON
    Tools,
    /// Run a single tool and print its output
    Invoke {
        /// Tool name, e.g. search_inventory
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
    /// Exercise all tools against the configured services
    Smoke {
        /// Skip Slack posts and the test allocation round trip
        #[arg(long)]
        skip_writes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn check_env() -> ExitCode {
    println!("Production Logistics Workshop - Environment Validation");
    println!("{}", "=".repeat(60));

    let report = EnvReport::from_process_env();
    if !report.is_complete() {
        println!("Missing required environment variables:");
        for name in &report.missing {
            println!("   - {name}");
        }
        println!();
        println!("Please configure these in .env.credentials");
        return ExitCode::FAILURE;
    }

    println!("Environment variables configured:");
    for (name, masked) in &report.present {
        println!("   {name}: {masked}");
    }
    println!("{}", "=".repeat(60));
    println!("Environment validation successful!");
    ExitCode::SUCCESS
}

async fn invoke(tool: String, args: &str) -> anyhow::Result<()> {
    let args: Value = serde_json::from_str(args).context("--args must be valid JSON")?;
    let ctx = ToolContext::new(Arc::new(Connections::from_env()));
    let invocation = ToolInvocation::new(tool, args).with_call_id(uuid::Uuid::new_v4().to_string());

    let result = workshop_registry().invoke(invocation, ctx).await?;
    let output = match result.as_json() {
        Some(json) => serde_json::to_string_pretty(json)?,
        None => result.message.content.as_text().unwrap_or_default().to_string(),
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_filename(".env.credentials");

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::CheckEnv => return Ok(check_env()),
        Commands::Tools => {
            let descriptors = workshop_registry().descriptors();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        }
        Commands::Invoke { tool, args } => invoke(tool, &args).await?,
        Commands::Smoke { skip_writes } => {
            let ctx = ToolContext::new(Arc::new(Connections::from_env()));
            let summary = smoke::run(&workshop_registry(), ctx, skip_writes).await;
            println!("\n{summary}");
            if summary.failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn invoke_args_default_to_empty_object() {
        let cli = Cli::parse_from(["logistics", "invoke", "get_schedule"]);
        match cli.command {
            Commands::Invoke { tool, args } => {
                assert_eq!(tool, "get_schedule");
                assert_eq!(args, "{}");
            }
            _ => panic!("expected invoke"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["logistics", "smoke", "--skip-writes", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Smoke { skip_writes: true }));
    }
}
