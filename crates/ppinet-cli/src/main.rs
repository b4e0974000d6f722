#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ppinet: protein-protein interaction network explorer",
    long_about = None
)]
struct Cli {
    /// Path to a ppinet.toml config file (default: ./ppinet.toml if present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Knowledge cache database path. Overrides PPINET_DB and the config file.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        OutputMode::from_json_flag(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Cache",
        about = "Create or migrate the knowledge cache",
        long_about = "Open the knowledge cache, applying migrations and seeding the default category palette.",
        after_help = "EXAMPLES:\n    # Initialize the default cache\n    ppinet init\n\n    # Use a project-local cache\n    ppinet --db genes.db init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Explore",
        about = "Analyze the interaction network of a gene list",
        long_about = "Enrich unknown genes, fetch their interaction network, and report centrality and modules.\n\
                      If the classifier proposes new categories, a review ticket is written instead.",
        after_help = "EXAMPLES:\n    # Analyze two genes at the default confidence\n    ppinet analyze TP53 MDM2\n\n    # Only keep high-confidence interactions\n    ppinet analyze TP53 MDM2 ATM --confidence 0.9 --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Explore",
        about = "Approve a category review ticket",
        long_about = "Create the categories listed in a review ticket, cache its genes, and run the deferred analysis.\n\
                      Delete entries from new_categories before approving to reject them.",
        after_help = "EXAMPLES:\n    # Approve everything proposed\n    ppinet approve ppinet-review.json"
    )]
    Approve(cmd::approve::ApproveArgs),

    #[command(
        next_help_heading = "Cache",
        about = "Show cached gene metadata",
        after_help = "EXAMPLES:\n    ppinet lookup TP53 brca1"
    )]
    Lookup(cmd::lookup::LookupArgs),

    #[command(next_help_heading = "Cache", about = "List functional categories")]
    Categories(cmd::categories::CategoriesArgs),

    #[command(
        next_help_heading = "Cache",
        about = "Show extended detail for a cached gene",
        long_about = "Print the extended clinical detail for a gene, fetching and caching it on first use.",
        after_help = "EXAMPLES:\n    ppinet detail TP53 --json"
    )]
    Detail(cmd::detail::DetailArgs),

    #[command(
        next_help_heading = "Cache",
        about = "Load the curated cancer-gene set",
        long_about = "Cache the curated tumor suppressors, oncogenes, kinases, and transcription factors.\n\
                      Genes already cached keep their stored classification.",
        after_help = "EXAMPLES:\n    ppinet seed"
    )]
    Seed(cmd::seed::SeedArgs),

    #[command(
        next_help_heading = "Lookup",
        about = "Show protein identity and reference links",
        after_help = "EXAMPLES:\n    ppinet protein TP53 --json"
    )]
    Protein(cmd::protein::ProteinArgs),

    #[command(
        next_help_heading = "Lookup",
        about = "Show known drug interactions for a gene",
        long_about = "Query DGIdb for drugs targeting a gene. An unreachable DGIdb is reported, not an error.",
        after_help = "EXAMPLES:\n    ppinet drugs BRAF"
    )]
    Drugs(cmd::drugs::DrugsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PPINET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "ppinet=debug,info"
        } else {
            "ppinet=info,warn"
        })
    });

    let format = env::var("PPINET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = cli.output_mode();
    let ctx = cmd::Context::load(cli.config.as_deref(), cli.db, output)?;
    debug!(db = %ctx.db_path.display(), "resolved knowledge cache");

    match cli.command {
        Commands::Init(args) => cmd::init::run_init(&args, &ctx),
        Commands::Analyze(args) => cmd::analyze::run_analyze(&args, &ctx),
        Commands::Approve(args) => cmd::approve::run_approve(&args, &ctx),
        Commands::Lookup(args) => cmd::lookup::run_lookup(&args, &ctx),
        Commands::Categories(args) => cmd::categories::run_categories(&args, &ctx),
        Commands::Detail(args) => cmd::detail::run_detail(&args, &ctx),
        Commands::Seed(args) => cmd::seed::run_seed(&args, &ctx),
        Commands::Protein(args) => cmd::protein::run_protein(&args, &ctx),
        Commands::Drugs(args) => cmd::drugs::run_drugs(&args, &ctx),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let output = cli.output_mode();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
