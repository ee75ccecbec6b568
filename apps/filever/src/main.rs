//! filever - file integrity verification
//!
//! Re-checks files against a CLIXML hash index produced by a prior scan, and
//! locates which byte windows differ between suspected duplicate copies.

mod cli;
mod commands;
mod display;
mod error;
mod logging;
mod progress;

use crate::cli::{Cli, Commands};
use crate::commands::{CommandOutcome, ProgressMode};
use crate::display::OutputRenderer;
use crate::error::CliError;
use clap::Parser;
use filever_config::Config;
use filever_events::{EventMessage, EventReceiver, EventSender};
use filever_types::{ColorChoice, OutputFormat};
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The log directory and output format are configurable, so
    // configuration comes before tracing
    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(e.exit_code());
        }
    };
    let json_mode = resolve_output(cli.global.json, config.general.default_output).is_json();

    init_tracing(json_mode, cli.global.debug, &config.log_dir());

    if let Err(e) = run(cli, config).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    info!("Starting filever v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = filever_events::channel();

    let output = resolve_output(cli.global.json, config.general.default_output);
    let renderer = OutputRenderer::new(output.is_json(), config.general.color);
    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let progress = ProgressMode {
        enabled: output == OutputFormat::Tty && console::Term::stderr().is_term(),
        colors: colors_enabled,
    };

    let result = execute_command_with_events(
        cli.command,
        &config,
        event_sender,
        event_receiver,
        progress,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// `--json` wins over the configured default output
fn resolve_output(json_flag: bool, configured: OutputFormat) -> OutputFormat {
    if json_flag {
        OutputFormat::Json
    } else {
        configured
    }
}

/// Load configuration with proper precedence: file, then environment, then
/// CLI flags.
async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command)?;
    config.validate()?;
    Ok(config)
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: &Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    progress: ProgressMode,
) -> Result<CommandOutcome, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender, progress));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    logging::log_event_with_tracing(&EventMessage::from_event(event));
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    logging::log_event_with_tracing(&EventMessage::from_event(event));
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: &Config,
    tx: EventSender,
    progress: ProgressMode,
) -> Result<CommandOutcome, CliError> {
    match command {
        Commands::Verify { index, .. } => {
            commands::verify_index(&index, config, tx, progress).await
        }
        Commands::Splits { files, .. } => commands::compare_files(&files, config, tx).await,
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "filever-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,filever=debug"),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(
    config: &mut Config,
    global: &cli::GlobalArgs,
    command: &Commands,
) -> Result<(), CliError> {
    if let Some(color) = &global.color {
        config.general.color = *color;
    }

    match command {
        Commands::Verify {
            workers, report, ..
        } => {
            if let Some(workers) = workers {
                config.verify.workers = *workers;
            }
            if let Some(report) = report {
                config.verify.report_path.clone_from(report);
            }
        }
        Commands::Splits { splits, alg, files } => {
            if files.len() < 2 {
                return Err(CliError::InvalidArguments(format!(
                    "need at least 2 files, got {}",
                    files.len()
                )));
            }
            if let Some(splits) = splits {
                if *splits == 0 {
                    return Err(CliError::InvalidArguments(
                        "--splits must be at least 1".to_string(),
                    ));
                }
                config.compare.splits = *splits;
            }
            if let Some(alg) = alg {
                config.compare.algorithm.clone_from(alg);
            }
        }
    }

    Ok(())
}
