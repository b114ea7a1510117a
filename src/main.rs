//! Bedrock Flows - Amazon Bedrock Flow manager
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use bedrock_flows::bedrock;
use bedrock_flows::cli::console::{styled, Console, Style};
use bedrock_flows::cli::StdinPrompter;
use bedrock_flows::core::InputContent;
use bedrock_flows::{Config, DeployOptions, FlowManager};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Create and run Amazon Bedrock Flows from templates
#[derive(Parser, Debug)]
#[command(name = "bedrock-flows")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// AWS region (defaults to AWS_REGION, AWS_DEFAULT_REGION, then us-west-2)
    #[arg(long, global = true)]
    region: Option<String>,

    /// AWS profile name (defaults to AWS_PROFILE, AWS_DEFAULT_PROFILE, then default)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Override the flow name from the template
    #[arg(long)]
    flow_name: Option<String>,

    /// Test input; several values are sent as a list
    #[arg(long, num_args = 1..)]
    test_input: Vec<String>,

    /// Parse a single test input as a JSON document
    #[arg(long, requires = "test_input")]
    json_input: bool,

    /// Delete the flow, version and alias after a successful run
    #[arg(long)]
    cleanup: bool,

    /// Directory containing flow templates
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    /// Use an existing IAM role instead of the managed one
    #[arg(long)]
    existing_role: Option<String>,

    /// Enable debug logging and print the conversation history
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a deployed flow's definition as a template file
    Export {
        /// Flow identifier
        flow_id: String,

        /// Output path (defaults to <templates-dir>/<name>_exported.json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "bedrock_flows=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", styled(&format!("\n❌ Error: {:#}", e), Style::Error));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(region) = args.region {
        config.aws.region = region;
    }
    if let Some(profile) = args.profile {
        config.aws.profile = profile;
    }
    if let Some(dir) = args.templates_dir {
        config.templates.dir = dir;
    }
    if args.existing_role.is_some() {
        config.flow.existing_role = args.existing_role;
    }

    let test_input = test_input(args.test_input, args.json_input)?;

    let backends = bedrock::connect(&config)
        .await
        .context("failed to set up AWS clients")?;
    let mut manager = FlowManager::new(
        backends,
        config,
        Console::stdout(),
        Box::new(StdinPrompter),
    );

    if let Some(Command::Export { flow_id, output }) = args.command {
        manager.export_flow(&flow_id, output.as_deref()).await?;
        return Ok(ExitCode::SUCCESS);
    }

    manager.ensure_role().await?;

    let Some(path) = manager.choose_template()? else {
        return Ok(ExitCode::FAILURE);
    };
    let processed = manager.process_template(&path)?;

    let options = DeployOptions {
        flow_name: args.flow_name,
        test_input,
        cleanup: args.cleanup,
    };
    let result = manager.deploy(&processed, &options).await;

    if args.verbose {
        if let Some(conversation) = manager.last_conversation() {
            let history = conversation.formatted_history();
            let console = manager.console();
            console.print(Style::Info, "\nConversation history:");
            console.raw(history);
        }
    }

    result?;
    manager
        .console()
        .print(Style::Success, "\n✨ Operation completed successfully!");
    Ok(ExitCode::SUCCESS)
}

/// Turn the `--test-input` values into flow input
fn test_input(values: Vec<String>, json: bool) -> anyhow::Result<Option<InputContent>> {
    if !json {
        return Ok(InputContent::from_args(values));
    }
    match values.as_slice() {
        [single] => {
            let document = serde_json::from_str(single)
                .with_context(|| format!("--test-input is not valid JSON: {}", single))?;
            Ok(Some(InputContent::Document(document)))
        }
        _ => bail!("--json-input takes exactly one --test-input value"),
    }
}
