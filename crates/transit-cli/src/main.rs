mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{route::RouteSubcommand, stop::StopSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transit",
    about = "Manage bus stops and routes, with undo inside an interactive shell",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .transit/)
    #[arg(long, global = true, env = "TRANSIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a transit project in the root directory
    Init {
        /// Project name (default: root directory name)
        #[arg(long)]
        project: Option<String>,
    },

    /// Manage the stop registry
    Stop {
        #[command(subcommand)]
        subcommand: StopSubcommand,
    },

    /// Manage routes and their stop sequences
    Route {
        #[command(subcommand)]
        subcommand: RouteSubcommand,
    },

    /// Read commands from stdin against one session; supports `undo`
    Shell,
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
        Commands::Init { project } => cmd::init::run(&root, project.as_deref(), cli.json),
        Commands::Stop { subcommand } => cmd::stop::run(&root, subcommand, cli.json),
        Commands::Route { subcommand } => cmd::route::run(&root, subcommand, cli.json),
        Commands::Shell => cmd::shell::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
