//! entdef CLI - inspect, validate and edit `.entdef` entity definitions

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{convert, hitbox, info, new, part, validate};
use config::EntdefConfig;

#[derive(Parser)]
#[command(name = "entdef")]
#[command(about = "Inspect, validate and edit .entdef entity definition files", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty entity definition
    New {
        /// Path of the file to create
        file: String,

        /// Entity id (a UUID is generated if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show header information and a summary of the entity
    Info {
        /// Path to .entdef file
        file: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Fully decode a file and report the first problem found
    Validate {
        /// Path to .entdef file
        file: String,
    },

    /// Write the payload as JSON for inspection
    Export {
        /// Path to .entdef file
        file: String,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build an .entdef file from exported JSON
    Import {
        /// Path to JSON file
        json: String,

        /// Output .entdef path
        #[arg(short, long)]
        output: String,
    },

    /// Rewrite a file at the current format version
    Upgrade {
        /// Path to .entdef file
        file: String,
    },

    /// Body part operations
    #[command(subcommand)]
    Part(part::PartCommands),

    /// Hitbox operations
    #[command(subcommand)]
    Hitbox(hitbox::HitboxCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EntdefConfig::load()?;
    logging::init(&config, cli.verbose)?;

    match cli.command {
        Commands::New { file, id, name } => new::run(&file, id.as_deref(), name.as_deref()),
        Commands::Info { file, format } => info::run(&file, &format),
        Commands::Validate { file } => validate::run(&file),
        Commands::Export { file, output } => {
            convert::export(&file, output.as_deref(), config.pretty_json)
        }
        Commands::Import { json, output } => convert::import(&json, &output),
        Commands::Upgrade { file } => convert::upgrade(&file),
        Commands::Part(cmd) => part::run(cmd, &config),
        Commands::Hitbox(cmd) => hitbox::run(cmd, &config),
    }
}
