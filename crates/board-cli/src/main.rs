mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, project::ProjectSubcommand, report::ReportSubcommand,
    session::SessionSubcommand, task::TaskSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "board",
    about = "Kanban task board with AI-assisted sprint planning, scope-creep, risk and retrospective reports",
    version,
    propagate_version = true
)]
struct Cli {
    /// Board root directory (defaults to the nearest ancestor with a .board/ directory)
    #[arg(long, global = true, env = "BOARD_ROOT")]
    root: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a board in the current directory
    Init {
        /// Board name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Create, list, show and delete projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage tasks on a project's board
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Sign in and select the active project
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
    },

    /// Generate an AI report
    Report {
        #[command(subcommand)]
        subcommand: ReportSubcommand,
    },

    /// Inspect and validate .board/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the board HTTP API
    Ui {
        /// Port to listen on (0 picks a free port)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Session { subcommand } => cmd::session::run(&root, subcommand, cli.json),
        Commands::Report { subcommand } => cmd::report::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
