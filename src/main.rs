use anyhow::Result;
use cbrfx::core::config::OutputFormat;
use cbrfx::core::log::init_logging;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log to stderr, repeat for more detail (-vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup {
        /// Feed identifier to list in the config, e.g. R01235. Repeat for more.
        #[arg(short, long = "id")]
        ids: Vec<String>,
    },
    /// Display currency rates
    Show {
        /// Output format, overrides the config file
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Feed identifier to show, e.g. R01235. Repeat for more.
        #[arg(short, long = "id")]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup { ids }) => cbrfx::cli::setup::setup(&ids),
        Some(Commands::Show { format, ids }) => {
            cbrfx::run_command(
                cbrfx::AppCommand::Show { format, ids },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
