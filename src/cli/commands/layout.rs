//! Offline layout of recognized spans.

use super::common::{preview, read_spans, read_style, write_output};
use crate::cli::{LayoutArgs, Output};
use crate::config::Settings;
use crate::markup::{format_cues, CueFormat};
use crate::media::VideoDimensions;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the layout command. Needs no external tools.
#[allow(clippy::too_many_arguments)]
pub fn run_layout(
    spans_path: &str,
    width: Option<u32>,
    height: Option<u32>,
    output: Option<&str>,
    format: &str,
    style_path: Option<&str>,
    layout: &LayoutArgs,
    settings: Settings,
) -> Result<()> {
    let format: CueFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let style = match style_path {
        Some(path) => read_style(path)?,
        None => settings.style.clone(),
    };

    let file = read_spans(spans_path)?;
    let (recorded_width, recorded_height) = file.canvas().unwrap_or((
        settings.media.fallback_width,
        settings.media.fallback_height,
    ));
    let canvas = VideoDimensions {
        width: width.unwrap_or(recorded_width),
        height: height.unwrap_or(recorded_height),
    };

    let orchestrator = Orchestrator::new(settings)?;
    let cfg = orchestrator.layout_config(&layout.overrides(), &style, canvas);
    let document = orchestrator.layout(file.into_spans(), cfg);

    write_output(output, &format_cues(&document, format, &style))?;

    if let Some(path) = output {
        Output::success(&format!(
            "Laid out {} spans into {} cues ({} chars/line, {} lines) -> {}",
            document.spans.len(),
            document.cues.len(),
            cfg.char_budget(),
            cfg.max_lines,
            path
        ));
        preview(&document.cues);
    }

    Ok(())
}
