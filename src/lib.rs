pub mod cli;
pub mod core;
pub mod pipeline;
pub mod providers;

use crate::core::config::{AppConfig, OutputFormat};
use crate::core::rates::Selector;
use crate::core::source::RateSource;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Show {
        format: Option<OutputFormat>,
        ids: Vec<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    run_command_with_output(command, config_path, &mut stdout, &mut stderr).await
}

/// Runs `command`, writing rate data to `out` and user facing messages to
/// `diagnostics`.
pub async fn run_command_with_output<W: std::io::Write, E: std::io::Write>(
    command: AppCommand,
    config_path: Option<&str>,
    out: &mut W,
    diagnostics: &mut E,
) -> Result<()> {
    info!("Currency rates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // One source per process so every stage shares its rate limit and cache
    let source: Arc<dyn RateSource> =
        Arc::new(providers::CbrRateSource::from_config(&config.feed)?);

    match command {
        AppCommand::Show { format, ids } => {
            let format = format.unwrap_or(config.output.format);
            let ids = if ids.is_empty() {
                config.currencies
            } else {
                ids
            };
            let selector = Selector::from_ids(&ids);
            debug!(?format, ?selector, "Rendering currency rates");

            let stage = pipeline::build_pipeline(format, source, config.output.json_indent);
            cli::show::render(stage.as_ref(), &selector, out, diagnostics).await?;
        }
    }

    Ok(())
}
