mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "streamwatch",
    version,
    about = "Clean, classify and threshold-check environmental monitoring workbooks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a dataset pipeline on a workbook and write the resulting tables
    Run(commands::run::RunArgs),
    /// Export every sheet of a workbook to its own CSV file
    Sheets {
        /// Path to the workbook (.xlsx, .xls, .ods)
        workbook: PathBuf,

        /// Directory for the CSV files
        #[arg(short = 'd', long = "out-dir", value_name = "DIR")]
        out_dir: PathBuf,
    },
    /// Inspect the built-in dataset presets
    Presets {
        #[command(subcommand)]
        action: PresetsAction,
    },
    /// Work with custom dataset config files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum PresetsAction {
    /// List built-in presets
    List,
    /// Explain a preset in plain language
    Explain {
        /// Preset name (e.g., "pwqmn")
        preset: String,
    },
    /// Print a preset's JSON, as a starting point for a custom config
    Show {
        /// Preset name
        preset: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config format with field descriptions
    Schema,
    /// Validate a custom config file
    Validate {
        /// Path to JSON config file
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Sheets { workbook, out_dir } => commands::sheets::run(&workbook, &out_dir),
        Commands::Presets { action } => match action {
            PresetsAction::List => commands::presets::list(),
            PresetsAction::Explain { preset } => commands::presets::explain(&preset),
            PresetsAction::Show { preset } => commands::presets::show(&preset),
        },
        Commands::Config { action } => match action {
            ConfigAction::Schema => commands::config::schema(),
            ConfigAction::Validate { file } => commands::config::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
