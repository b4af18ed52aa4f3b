//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::{Settings, TranscriptionProvider};
use console::style;
use std::io::{self, Write};
use std::path::Path;

/// Simple check result for init command.
struct CheckIssue {
    name: String,
    hint: String,
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Subburn Setup");
    println!();
    println!("Welcome to Subburn! Let's make sure everything is configured correctly.\n");

    // Step 1: Check prerequisites
    println!("{}", style("Step 1: Checking prerequisites").bold().cyan());
    println!();

    let tool_issues = check_prerequisites(settings);

    if !tool_issues.is_empty() {
        Output::warning("Some tools are missing. Please install them:");
        println!();
        for issue in &tool_issues {
            println!("  {} {} - not found", style("✗").red(), style(&issue.name).bold());
            println!("    {} {}", style("→").dim(), style(&issue.hint).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Install the missing tools and run 'subburn init' again.");
            return Ok(());
        }
    } else {
        Output::success("All required tools are installed!");
    }

    println!();

    // Step 2: Check the recognizer
    println!("{}", style("Step 2: Checking transcription").bold().cyan());
    println!();

    match settings.transcription.provider {
        TranscriptionProvider::OpenAI if std::env::var("OPENAI_API_KEY").is_err() => {
            Output::warning("OPENAI_API_KEY environment variable is not set.");
            println!();
            println!("  The openai provider sends audio to the Whisper API.");
            println!("  Get your API key from: {}", style("https://platform.openai.com/api-keys").underlined());
            println!();
            println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
            println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
            println!();
            println!("  Or transcribe locally with the whisper CLI:");
            println!("  {}", style("subburn config set transcription.provider local").green());
            println!();

            if !prompt_continue("Continue without API key?")? {
                println!();
                Output::info("Setup cancelled. Set your API key and run 'subburn init' again.");
                return Ok(());
            }
        }
        TranscriptionProvider::OpenAI => Output::success("OpenAI API key is configured!"),
        TranscriptionProvider::Local => Output::info(&format!(
            "Using local transcription: {} --model {}",
            settings.transcription.local_command, settings.transcription.local_model
        )),
    }

    println!();

    // Step 3: Create directories
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    for (name, dir) in [
        ("data", settings.data_dir()),
        ("temp", settings.temp_dir()),
        ("upload", settings.upload_dir()),
        ("output", settings.output_dir()),
    ] {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created {} directory: {}", name, dir.display()));
        } else {
            Output::info(&format!("{} directory exists: {}", name, dir.display()));
        }
    }

    println!();

    // Step 4: Create config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path.to_path_buf())?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("subburn config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("subburn doctor").cyan());
    println!("  {} Generate subtitles", style("subburn transcribe talk.mp4 -o talk.json").cyan());
    println!("  {} Burn them in", style("subburn render talk.mp4 --subtitles talk.json").cyan());
    println!("  {} Serve the web API", style("subburn serve").cyan());
    println!();
    println!("For more help: {}", style("subburn --help").cyan());

    Ok(())
}

/// Check prerequisites and return any issues.
fn check_prerequisites(settings: &Settings) -> Vec<CheckIssue> {
    let mut tools = vec!["ffmpeg", "ffprobe"];
    if settings.transcription.provider == TranscriptionProvider::Local {
        tools.push(settings.transcription.local_command.as_str());
    }

    tools
        .into_iter()
        .filter(|tool| crate::cli::preflight::check_tool(tool).is_err())
        .map(|tool| CheckIssue {
            name: tool.to_string(),
            hint: install_hint(tool).to_string(),
        })
        .collect()
}

/// Get platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "ffmpeg" | "ffprobe" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install ffmpeg"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install ffmpeg"
            } else {
                "Install from: https://ffmpeg.org/download.html"
            }
        }
        "whisper" => "Install with: pip install openai-whisper",
        _ => "Check the documentation for installation instructions",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
