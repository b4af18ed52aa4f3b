//! Render command: burn subtitles into a video.

use super::common::{read_spans, read_style};
use crate::cli::preflight::{self, Operation};
use crate::cli::{LayoutArgs, Output};
use crate::config::Settings;
use crate::highlight::HighlightMode;
use crate::jobs::JobRegistry;
use crate::markup::{Anchor, StyleSpec};
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use indicatif::ProgressBar;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Run the render command.
#[allow(clippy::too_many_arguments)]
pub async fn run_render(
    input: &str,
    subtitles: &str,
    output: Option<&str>,
    style_path: Option<&str>,
    highlight: Option<&str>,
    position: Option<&str>,
    layout: &LayoutArgs,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Render, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'subburn doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let base_style = match style_path {
        Some(path) => read_style(path)?,
        None => settings.style.clone(),
    };
    let style = apply_flags(base_style, highlight, position);
    let spans = read_spans(subtitles)?.into_spans();
    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(Path::new(input)));

    let orchestrator = Orchestrator::new(settings)?;
    let jobs = orchestrator.jobs();
    let job = Uuid::new_v4();

    Output::info(&format!(
        "Rendering {} spans onto {} ({} highlight)",
        spans.len(),
        input,
        style.highlight()
    ));
    let pb = Output::progress_bar(100, "Preparing");

    let overrides = layout.overrides();
    let render = orchestrator.render_video(
        Path::new(input),
        &spans,
        &style,
        &overrides,
        &output,
        Some(job),
    );
    let result = follow_progress(render, &jobs, job, &pb).await;

    match result {
        Ok(outcome) => {
            pb.finish_and_clear();
            Output::success(&format!("Created {}", outcome.output.display()));
            Output::kv("Cues", &outcome.cue_count.to_string());
            Output::kv("Font size", &outcome.layout.font_size.to_string());
            Output::kv(
                "Canvas",
                &format!("{}x{}", outcome.layout.video_width, outcome.layout.video_height),
            );
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("failed");
            Err(e.into())
        }
    }
}

/// Drive `work` to completion, mirroring the job's progress onto `pb`.
async fn follow_progress<F: Future>(
    work: F,
    jobs: &JobRegistry,
    job: Uuid,
    pb: &ProgressBar,
) -> F::Output {
    tokio::pin!(work);
    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    loop {
        tokio::select! {
            result = &mut work => return result,
            _ = ticker.tick() => {
                if let Some(status) = jobs.get(&job) {
                    pb.set_position(status.progress as u64);
                    pb.set_message(status.message);
                }
            }
        }
    }
}

/// Command-line switches win over the style file.
fn apply_flags(mut style: StyleSpec, highlight: Option<&str>, position: Option<&str>) -> StyleSpec {
    if let Some(mode) = highlight {
        style.highlight_mode = HighlightMode::parse(mode);
        style.use_karaoke = None;
    }
    if let Some(name) = position {
        style.position = Anchor::parse(name);
        style.use_custom_position = false;
    }
    style
}

/// `talk.mp4` -> `talk_subtitled.mp4` next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string());
    input.with_file_name(format!("{}_subtitled.{}", stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobState;

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("/videos/talk.mkv")),
            PathBuf::from("/videos/talk_subtitled.mkv")
        );
        assert_eq!(default_output(Path::new("clip")), PathBuf::from("clip_subtitled.mp4"));
    }

    #[test]
    fn test_flags_override_style() {
        let style = StyleSpec {
            use_karaoke: Some(true),
            use_custom_position: true,
            ..StyleSpec::default()
        };
        let style = apply_flags(style, Some("color"), Some("top-left"));
        assert_eq!(style.highlight(), HighlightMode::Color);
        assert_eq!(style.position, Anchor::TopLeft);
        assert!(!style.use_custom_position);
    }

    #[tokio::test]
    async fn test_follow_progress_reports_job_status() {
        let jobs = JobRegistry::new();
        let job = Uuid::new_v4();
        jobs.update(job, JobState::Encoding, 42, "Encoding video: 40%");
        let pb = ProgressBar::hidden();

        let value = follow_progress(
            async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                7
            },
            &jobs,
            job,
            &pb,
        )
        .await;

        assert_eq!(value, 7);
        assert_eq!(pb.position(), 42);
        assert_eq!(pb.message(), "Encoding video: 40%");
    }

    #[test]
    fn test_no_flags_keep_style() {
        let style = StyleSpec {
            use_karaoke: Some(true),
            ..StyleSpec::default()
        };
        let style = apply_flags(style, None, None);
        assert_eq!(style.highlight(), HighlightMode::Karaoke);
    }
}
