mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

#[derive(Parser)]
#[command(name = "laravel-guard")]
#[command(about = "Configuration and deployment analysis for Laravel applications")]
#[command(version)]
struct Cli {
    /// Log progress to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a Laravel project
    Analyze {
        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Environment name (default: app.env from the config dump)
        #[arg(long)]
        env: Option<String>,

        /// JSON dump of the resolved configuration
        /// (default: <path>/.laravel-guard/config.json)
        #[arg(long)]
        config_dump: Option<PathBuf>,

        /// Saved `php -i` output; by default `php -i` is run on this host
        #[arg(long)]
        php_info: Option<PathBuf>,

        /// Output format (default: output_format from the config file)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Run only these analyzers (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        analyzers: Option<Vec<String>>,

        /// Exclude these analyzers (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Path to config file (default: <path>/.laravel-guard.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Running in CI: skip analyzers that need a live runtime or deploy artifacts
        #[arg(long)]
        ci: bool,

        /// Exit with a failure code on warnings too
        #[arg(long)]
        strict: bool,

        /// Suppress banner and summary
        #[arg(short, long)]
        quiet: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// List all available analyzers
    List,
    /// Generate a default .laravel-guard.toml config file
    Init,
}

#[derive(ValueEnum, Clone)]
pub enum OutputFormat {
    Text,
    Json,
    Sarif,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            path,
            env,
            config_dump,
            php_info,
            format,
            analyzers,
            exclude,
            config,
            ci,
            strict,
            quiet,
            no_color,
        } => commands::analyze::run(commands::analyze::Options {
            path,
            env,
            config_dump,
            php_info,
            format,
            analyzers,
            exclude,
            config,
            ci,
            strict,
            quiet,
            no_color,
        }),
        Commands::List => commands::list::run(),
        Commands::Init => commands::init::run(),
    }
}
