mod cmd;
mod output;
mod root;
mod tools;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, params::ParamArgs, saves::SavesSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "script-creator",
    about = "Generate libEnsemble run scripts, simulation functions and batch scripts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .script-creator/ or .git/)
    #[arg(long, global = true, env = "SCRIPT_CREATOR_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .script-creator/ with a default config
    Init,

    /// Render scripts from a set of parameters
    Generate {
        #[command(flatten)]
        params: ParamArgs,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the sectioned text instead of writing files
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },

    /// Print the normalized template data for a set of parameters
    Normalize {
        #[command(flatten)]
        params: ParamArgs,
    },

    /// Print the default set_objective_value() function
    Objective {
        /// Application reference name
        #[arg(long)]
        app_ref: String,
    },

    /// List the generator catalog
    Generators,

    /// Split sectioned script text (`=== name ===` headers) into files
    Split {
        /// Input file, or `-` for stdin
        file: PathBuf,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage saved parameter sets
    Saves {
        #[command(subcommand)]
        subcommand: SavesSubcommand,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run as an MCP stdio server
    Mcp,

    /// Launch the web UI
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } | Commands::Mcp => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Generate {
            params,
            out,
            stdout,
        } => cmd::generate::run(&root, &params, out.as_deref(), stdout, cli.json),
        Commands::Normalize { params } => cmd::generate::normalize(&root, &params),
        Commands::Objective { app_ref } => cmd::objective::run(&app_ref, cli.json),
        Commands::Generators => cmd::generators::run(&root, cli.json),
        Commands::Split { file, out } => cmd::split::run(&root, &file, out.as_deref(), cli.json),
        Commands::Saves { subcommand } => cmd::saves::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Mcp => cmd::mcp::run(&root),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
