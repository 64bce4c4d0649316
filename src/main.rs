// Portfolio Review - structured case review generation and editing
// Main entry point

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use portfolio_review::catalog::CapabilityCatalog;
use portfolio_review::cli::{render_catalog, render_document, Repl};
use portfolio_review::clipboard::{ClipboardExporter, SystemClipboard};
use portfolio_review::config::{load_config, Config};
use portfolio_review::document::CopyTarget;
use portfolio_review::service::{HttpReviewService, ReviewService};
use portfolio_review::{CapabilitySelection, GenerationWorkflow, Outcome, ToggleOutcome};

#[derive(Parser)]
#[command(name = "portfolio-review", version, about = "Generate and refine structured case reviews")]
struct Cli {
    /// Base URL of the review service (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Read capabilities from an outline file instead of the service
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available capabilities
    Capabilities,
    /// Generate a review and print it
    Generate {
        /// Case description
        #[arg(short, long, conflicts_with = "file")]
        description: Option<String>,
        /// Read the case description from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Capability to scope the review to (1-3)
        #[arg(short = 'c', long = "capability", required = true)]
        capabilities: Vec<String>,
        /// Copy a section after generating (e.g. reflection, capabilities.<name>)
        #[arg(long)]
        copy: Option<String>,
        /// Print the raw JSON document
        #[arg(long)]
        json: bool,
    },
    /// Interactive session (default)
    Session,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "portfolio_review=debug"
    } else {
        "portfolio_review=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_workflow(config: &Config) -> Result<GenerationWorkflow> {
    let service: Arc<dyn ReviewService> = Arc::new(
        HttpReviewService::from_config(config).context("Failed to create service client")?,
    );

    match &config.catalog_path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            let catalog = CapabilityCatalog::parse_outline(&contents);
            if catalog.is_empty() {
                bail!("Catalog {} contains no capabilities", path.display());
            }
            Ok(GenerationWorkflow::new(service, Arc::new(catalog)))
        }
        None => GenerationWorkflow::connect(service)
            .await
            .context("Failed to load capabilities"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if let Some(path) = cli.catalog {
        config.catalog_path = Some(path);
    }

    let workflow = build_workflow(&config).await?;
    let exporter =
        ClipboardExporter::with_indicator(Arc::new(SystemClipboard), config.copy_indicator());

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Capabilities => {
            print!("{}", render_catalog(workflow.catalog(), None));
        }
        Commands::Generate {
            description,
            file,
            capabilities,
            copy,
            json,
        } => {
            let description = match (description, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Provide --description or --file"),
            };

            let mut selection = CapabilitySelection::new(Arc::clone(workflow.catalog()));
            for name in &capabilities {
                match selection.toggle(name) {
                    ToggleOutcome::Added => {}
                    ToggleOutcome::Removed => bail!("Capability {:?} given twice", name),
                    ToggleOutcome::Saturated => bail!("Select no more than 3 capabilities"),
                    ToggleOutcome::Unknown => bail!("Unknown capability {:?}", name),
                }
            }

            if workflow.generate(&description, &selection).await? != Outcome::Applied {
                bail!("Generation was superseded");
            }
            let document = workflow
                .snapshot()
                .await
                .context("No document after generation")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                println!("{}", render_document(&document, &[]));
            }

            if let Some(target) = copy {
                let target: CopyTarget = target.parse()?;
                let text = document
                    .target_text(&target)
                    .with_context(|| format!("No section {}", target))?;
                if exporter.copy_section(target.clone(), text).await {
                    eprintln!("✓ Copied {} to clipboard", target);
                }
            }
        }
        Commands::Session => {
            let mut repl = Repl::new(workflow, exporter);
            repl.run().await?;
        }
    }

    Ok(())
}
