use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "vidcoder-cli", version, about = "Vidcoder CLI")]
struct Cli {
    /// Project directory holding config.toml and annotations.csv
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Coder recorded when the project is saved, as "Name <email>"
    #[arg(long, global = true, env = "VIDCODER_CODER")]
    coder: Option<String>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project in the project directory
    Init,
    /// Project configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Timeline and label management
    Timeline {
        #[command(subcommand)]
        action: commands::timeline::TimelineAction,
    },
    /// Create and edit annotations
    Annotate {
        #[command(subcommand)]
        action: commands::annotate::AnnotateAction,
    },
    /// CSV export and import
    Csv {
        #[command(subcommand)]
        action: commands::csv::CsvAction,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("vidcoder_core=debug,vidcoder_cli=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(cli.project, cli.coder.as_deref());
    let result = match cli.command {
        Commands::Init => commands::project::init(&ctx),
        Commands::Config { action } => commands::config::run(&ctx, action),
        Commands::Timeline { action } => commands::timeline::run(&ctx, action),
        Commands::Annotate { action } => commands::annotate::run(&ctx, action),
        Commands::Csv { action } => commands::csv::run(&ctx, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
