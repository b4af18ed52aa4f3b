//! Transcribe command implementation.

use super::common::{preview, write_output};
use crate::cli::preflight::{self, Operation};
use crate::cli::{format_duration, LayoutArgs, Output};
use crate::config::Settings;
use crate::markup::{format_cues, CueFormat};
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &str,
    output: Option<&str>,
    format: &str,
    language: Option<&str>,
    model: Option<&str>,
    layout: &LayoutArgs,
    settings: Settings,
) -> Result<()> {
    let format: CueFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Transcribe, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'subburn doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let style = settings.style.clone();
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Transcribing {}...", input));
    let result = orchestrator
        .transcribe_media(Path::new(input), &layout.overrides(), language, model, None)
        .await;
    spinner.finish_and_clear();
    let document = result?;

    let content = format_cues(&document, format, &style);
    write_output(output, &content)?;

    // stdout carries the cues when no output file is given
    if let Some(path) = output {
        let duration = document.cues.last().map(|c| c.end).unwrap_or(0.0);
        Output::success(&format!("Wrote {} cues to {}", document.cues.len(), path));
        Output::kv("Spans", &document.spans.len().to_string());
        Output::kv("Duration", &format_duration(duration));
        Output::kv(
            "Canvas",
            &format!("{}x{}", document.layout.video_width, document.layout.video_height),
        );
        Output::kv("Characters per line", &document.layout.char_budget().to_string());
        preview(&document.cues);
    }

    Ok(())
}
