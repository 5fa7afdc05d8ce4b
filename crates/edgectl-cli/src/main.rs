//! edgectl - Edge Fleet Deployment & Twin Tag Manager
//!
//! Usage:
//!   edgectl tag --tags '{"environment":"dev"}'
//!   edgectl tag --tags '{"environment":"dev"}' -d -f deployment.json -n rollout-1 -p 10

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edgectl_core::commands::{DeploymentOptions, StageContext, TagCommand, TagOptions};
use edgectl_core::report;
use edgectl_core::settings::Settings;

#[derive(Parser)]
#[command(name = "edgectl")]
#[command(about = "Edge fleet deployment and device twin tag manager", long_about = None)]
struct Cli {
    /// Settings file path (defaults to ./edgectl.toml, then the user
    /// config directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge tags into the device twin, optionally gated on a
    /// deployment rollout
    Tag(TagArgs),
}

#[derive(Args)]
struct TagArgs {
    /// JSON object of tags to merge into the device twin
    ///
    /// A bare `--tags` (no value) surfaces here as an empty string so
    /// the usage error stays ours rather than clap's.
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    tags: Option<String>,

    /// Run the deployment stage before applying tags
    #[arg(short = 'd', long)]
    deploy: bool,

    /// Deployment manifest template path
    #[arg(short = 'f', long, required_if_eq("deploy", "true"))]
    file: Option<PathBuf>,

    /// Deployment name
    #[arg(short = 'n', long, required_if_eq("deploy", "true"))]
    name: Option<String>,

    /// Deployment priority (control plane default when omitted)
    #[arg(short = 'p', long)]
    priority: Option<u32>,

    /// Target condition expression selecting devices
    #[arg(short = 't', long)]
    target_condition: Option<String>,

    /// Target platform identifier
    #[arg(short = 'P', long, default_value = "amd64")]
    platform: String,

    /// Override the configured device id
    #[arg(long)]
    device: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for stage outcome lines.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edgectl=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tag(args) => run_tag(args, cli.config.as_deref()).await,
    }
}

async fn run_tag(args: TagArgs, config: Option<&Path>) -> Result<()> {
    let raw_tags = match args.tags.as_deref() {
        Some(raw) if !raw.is_empty() => raw.to_string(),
        _ => {
            println!("Error: Option '--tags' requires an argument.");
            std::process::exit(2);
        }
    };

    let mut settings = Settings::load(config)?;
    if let Some(device) = args.device {
        settings.device_id = device;
    }

    let mut options = TagOptions::new(raw_tags);
    if args.deploy {
        // clap enforces -f/-n when -d is set; these contexts cover
        // programmatic construction.
        let file = args.file.context("--file is required with --deploy")?;
        let name = args.name.context("--name is required with --deploy")?;

        let mut deployment = DeploymentOptions::new(file, name).with_platform(args.platform);
        if let Some(priority) = args.priority {
            deployment = deployment.with_priority(priority);
        }
        if let Some(condition) = args.target_condition {
            deployment = deployment.with_target_condition(condition);
        }
        options = options.with_deployment(deployment);
    }

    let ctx = StageContext::from_settings(&settings)?;
    let outcomes = TagCommand::new(&ctx).execute(&options).await;

    print!("{}", report::render(&outcomes));

    if !report::is_success(&outcomes) {
        std::process::exit(1);
    }
    Ok(())
}
