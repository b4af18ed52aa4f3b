//! Subburn CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use subburn::cli::{commands, Cli, Commands};
use subburn::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("subburn={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings, &config_path)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Transcribe {
            input,
            output,
            format,
            language,
            model,
            layout,
        } => {
            commands::run_transcribe(
                input,
                output.as_deref(),
                format,
                language.as_deref(),
                model.as_deref(),
                layout,
                settings,
            )
            .await?;
        }

        Commands::Layout {
            spans,
            width,
            height,
            output,
            format,
            style,
            layout,
        } => {
            commands::run_layout(
                spans,
                *width,
                *height,
                output.as_deref(),
                format,
                style.as_deref(),
                layout,
                settings,
            )?;
        }

        Commands::Render {
            input,
            subtitles,
            output,
            style,
            highlight,
            position,
            layout,
        } => {
            commands::run_render(
                input,
                subtitles,
                output.as_deref(),
                style.as_deref(),
                highlight.as_deref(),
                position.as_deref(),
                layout,
                settings,
            )
            .await?;
        }

        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
