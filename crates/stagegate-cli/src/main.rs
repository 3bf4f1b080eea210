mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, feature::FeatureSubcommand, mapping::TestsSubcommand,
    review::ReviewSubcommand, task::TaskSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stagegate",
    about = "Stage-gated feature pipeline: requirements, seed, scenarios, tests, implementation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .stagegate/ or .git/)
    #[arg(long, global = true, env = "STAGEGATE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize stagegate in the current project
    Init {
        /// Project name (default: the root directory's name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage the feature registry
    Feature {
        #[command(subcommand)]
        subcommand: FeatureSubcommand,
    },

    /// Record review scores and verdicts
    Review {
        #[command(subcommand)]
        subcommand: ReviewSubcommand,
    },

    /// Decide whether a file may be written (exit 2 when denied)
    GateCheck {
        /// File about to be written (absolute, or relative to the project root)
        path: PathBuf,
    },

    /// Advance a feature's stage after a file was written
    Track {
        /// File that was written (absolute, or relative to the project root)
        path: PathBuf,
    },

    /// Check the whole pipeline and report every problem
    Validate,

    /// Refresh artifact fingerprints and report regressions
    Reconcile,

    /// Show what to do next for each feature
    Context {
        /// Only show this feature
        #[arg(long = "for")]
        feature: Option<String>,
    },

    /// Manage the task list
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Manage explicit test-file mappings
    Tests {
        #[command(subcommand)]
        subcommand: TestsSubcommand,
    },

    /// Show recorded feature state
    State {
        #[arg(long = "for")]
        feature: Option<String>,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Feature { subcommand } => cmd::feature::run(&root, subcommand, cli.json),
        Commands::Review { subcommand } => cmd::review::run(&root, subcommand, cli.json),
        Commands::GateCheck { path } => cmd::gate_check::run(&root, &path, cli.json),
        Commands::Track { path } => cmd::track::run(&root, &path, cli.json),
        Commands::Validate => cmd::validate::run(&root, cli.json),
        Commands::Reconcile => cmd::reconcile::run(&root, cli.json),
        Commands::Context { feature } => cmd::context::run(&root, feature.as_deref(), cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Tests { subcommand } => cmd::mapping::run(&root, subcommand, cli.json),
        Commands::State { feature } => cmd::state::run(&root, feature.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
