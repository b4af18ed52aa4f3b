//! Pipeline orchestrator for Subburn.
//!
//! Coordinates media probing, audio extraction, transcription, layout and
//! burn-in. The layout and markup stages are pure; everything that touches
//! files or external tools happens here.

use crate::config::Settings;
use crate::error::{Result, SubburnError};
use crate::jobs::{JobRegistry, JobState};
use crate::layout::{scale_font_size, segment, DisplayCue, LayoutConfig, RecognizedSpan};
use crate::markup::{self, CueDocument, StyleSpec};
use crate::media::{self, VideoDimensions};
use crate::transcription::ModelRegistry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Per-request layout parameters; unset fields use the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayoutOverrides {
    #[serde(alias = "maxLines")]
    pub max_lines: Option<usize>,
    /// Fraction or percentage of the video width.
    #[serde(alias = "maxWidth", alias = "maxWidthPercent")]
    pub max_width_percent: Option<f64>,
    #[serde(alias = "fontSize")]
    pub font_size: Option<u32>,
}

/// Result of rendering a video with burned-in subtitles.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub output: PathBuf,
    pub layout: LayoutConfig,
    pub cue_count: usize,
}

/// The main orchestrator for the Subburn pipeline.
pub struct Orchestrator {
    settings: Settings,
    models: Arc<ModelRegistry>,
    jobs: Arc<JobRegistry>,
    temp_dir: PathBuf,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let models = Arc::new(ModelRegistry::new(settings.transcription.clone()));
        Self::with_components(settings, models, Arc::new(JobRegistry::new()))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        models: Arc<ModelRegistry>,
        jobs: Arc<JobRegistry>,
    ) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            settings,
            models,
            jobs,
            temp_dir,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn jobs(&self) -> Arc<JobRegistry> {
        self.jobs.clone()
    }

    pub fn models(&self) -> Arc<ModelRegistry> {
        self.models.clone()
    }

    /// Resolve layout parameters for a canvas. The base font size is the
    /// override, else the style's; it is scaled to the video width when
    /// enabled in settings.
    pub fn layout_config(
        &self,
        overrides: &LayoutOverrides,
        style: &StyleSpec,
        canvas: VideoDimensions,
    ) -> LayoutConfig {
        let defaults = &self.settings.layout;
        let base_font = overrides.font_size.unwrap_or(style.font_size);
        let font_size = if defaults.scale_font_to_video {
            scale_font_size(base_font, canvas.width)
        } else {
            base_font
        };

        let cfg = LayoutConfig::new(
            overrides.max_lines.unwrap_or(defaults.max_lines),
            overrides.max_width_percent.unwrap_or(defaults.max_width_percent),
            font_size,
            canvas.width,
            canvas.height,
        );

        if cfg.video_width == 0 || cfg.font_size == 0 || !(cfg.max_width_percent > 0.0) {
            warn!(
                "Degenerate layout ({}px wide, font {}, width {}); using {} chars per line",
                cfg.video_width,
                cfg.font_size,
                cfg.max_width_percent,
                cfg.char_budget()
            );
        }
        cfg
    }

    /// Probe the video size, falling back to the configured canvas.
    pub async fn probe_canvas(&self, media: &Path) -> VideoDimensions {
        match media::probe_dimensions(media).await {
            Ok(dims) => dims,
            Err(e) => {
                warn!("Using fallback canvas for {:?}: {}", media, e);
                VideoDimensions {
                    width: self.settings.media.fallback_width,
                    height: self.settings.media.fallback_height,
                }
            }
        }
    }

    /// Lay out spans into cues for a canvas.
    pub fn layout(&self, spans: Vec<RecognizedSpan>, cfg: LayoutConfig) -> CueDocument {
        let cues = segment(&spans, &cfg);
        CueDocument {
            layout: cfg,
            spans,
            cues,
        }
    }

    /// Transcribe a media file and lay out its subtitles.
    ///
    /// Progress is recorded under `job` when given.
    #[instrument(skip(self, overrides), fields(media = %media.display()))]
    pub async fn transcribe_media(
        &self,
        media: &Path,
        overrides: &LayoutOverrides,
        language: Option<&str>,
        model: Option<&str>,
        job: Option<Uuid>,
    ) -> Result<CueDocument> {
        let result = self
            .transcribe_media_inner(media, overrides, language, model, job)
            .await;
        self.finish(job, &result, "Subtitles generated");
        result
    }

    async fn transcribe_media_inner(
        &self,
        media: &Path,
        overrides: &LayoutOverrides,
        language: Option<&str>,
        model: Option<&str>,
        job: Option<Uuid>,
    ) -> Result<CueDocument> {
        ensure_exists(media)?;

        self.report(job, JobState::Processing, 5, "Probing media");
        let canvas = self.probe_canvas(media).await;

        let work_dir = self.work_dir()?;
        let audio_path = work_dir.path().join("audio.wav");
        self.report(job, JobState::Processing, 10, "Extracting audio");
        media::extract_audio(media, &audio_path).await?;

        let spans = self.transcribe_audio(&audio_path, language, model, job).await?;

        self.report(job, JobState::Processing, 90, "Laying out subtitles");
        let cfg = self.layout_config(overrides, &self.settings.style, canvas);
        let document = self.layout(spans, cfg);
        info!(
            "Laid out {} spans into {} cues for {}x{}",
            document.spans.len(),
            document.cues.len(),
            canvas.width,
            canvas.height
        );

        Ok(document)
    }

    /// Transcribe an extracted audio file with the requested model.
    pub async fn transcribe_audio(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        model: Option<&str>,
        job: Option<Uuid>,
    ) -> Result<Vec<RecognizedSpan>> {
        let transcriber = self.models.acquire(model).await?;
        let language = language.or(self.settings.transcription.language.as_deref());

        self.report(
            job,
            JobState::Transcribing,
            20,
            format!("Transcribing audio with {}", transcriber.model()),
        );
        let spans = transcriber.transcribe(audio_path, language).await?;
        info!("Recognized {} spans", spans.len());
        Ok(spans)
    }

    /// Lay out spans for the video, write the ASS script and burn it in.
    #[instrument(skip(self, spans, style, overrides), fields(media = %media.display()))]
    pub async fn render_video(
        &self,
        media: &Path,
        spans: &[RecognizedSpan],
        style: &StyleSpec,
        overrides: &LayoutOverrides,
        output: &Path,
        job: Option<Uuid>,
    ) -> Result<RenderOutcome> {
        let result = self
            .render_inner(media, CueSource::Spans(spans), style, overrides, output, job)
            .await;
        self.finish(job, &result, "Video created");
        result
    }

    /// Burn already laid out cues into the video as they are. The layout
    /// parameters only size the script canvas and font.
    #[instrument(skip(self, cues, style, overrides), fields(media = %media.display()))]
    pub async fn render_cues(
        &self,
        media: &Path,
        cues: &[DisplayCue],
        style: &StyleSpec,
        overrides: &LayoutOverrides,
        output: &Path,
        job: Option<Uuid>,
    ) -> Result<RenderOutcome> {
        let result = self
            .render_inner(media, CueSource::Cues(cues), style, overrides, output, job)
            .await;
        self.finish(job, &result, "Video created");
        result
    }

    async fn render_inner(
        &self,
        media: &Path,
        source: CueSource<'_>,
        style: &StyleSpec,
        overrides: &LayoutOverrides,
        output: &Path,
        job: Option<Uuid>,
    ) -> Result<RenderOutcome> {
        ensure_exists(media)?;

        self.report(job, JobState::Processing, 5, "Preparing subtitles");
        let canvas = self.probe_canvas(media).await;

        let cfg = self.layout_config(overrides, style, canvas);
        let style = style.clone().with_font_size(cfg.font_size);

        let cues = source.into_cues(&cfg);
        if cues.is_empty() {
            warn!("No subtitle text to burn in");
        }
        let script = markup::emit(&cues, &style, &cfg);

        let work_dir = self.work_dir()?;
        let script_path = work_dir.path().join("subtitles.ass");
        tokio::fs::write(&script_path, script).await?;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.report(job, JobState::Encoding, 10, "Encoding video");
        let jobs = self.jobs.clone();
        media::burn_subtitles(
            media,
            &script_path,
            output,
            &self.settings.media.preset,
            move |fraction| {
                if let Some(id) = job {
                    jobs.update(
                        id,
                        JobState::Encoding,
                        (10.0 + fraction * 89.0) as u8,
                        format!("Encoding video: {:.0}%", fraction * 100.0),
                    );
                }
            },
        )
        .await?;

        info!("Rendered {:?} with {} cues", output, cues.len());
        Ok(RenderOutcome {
            output: output.to_path_buf(),
            layout: cfg,
            cue_count: cues.len(),
        })
    }

    /// Scratch directory for one job, removed when dropped.
    fn work_dir(&self) -> Result<tempfile::TempDir> {
        Ok(tempfile::Builder::new()
            .prefix("job-")
            .tempdir_in(&self.temp_dir)?)
    }

    fn report(&self, job: Option<Uuid>, state: JobState, progress: u8, message: impl Into<String>) {
        if let Some(id) = job {
            self.jobs.update(id, state, progress, message);
        }
    }

    fn finish<T>(&self, job: Option<Uuid>, result: &Result<T>, done: &str) {
        match result {
            Ok(_) => self.report(job, JobState::Completed, 100, done),
            Err(e) => {
                warn!("Job failed: {}", e);
                if let Some(id) = job {
                    self.jobs.fail(id, e.to_string());
                }
            }
        }
    }
}

/// What `render_inner` burns in.
enum CueSource<'a> {
    Spans(&'a [RecognizedSpan]),
    Cues(&'a [DisplayCue]),
}

impl CueSource<'_> {
    /// Spans are laid out for `cfg`. Cues are kept, minus any without text.
    fn into_cues(self, cfg: &LayoutConfig) -> Vec<DisplayCue> {
        match self {
            CueSource::Spans(spans) => segment(spans, cfg),
            CueSource::Cues(cues) => cues
                .iter()
                .filter(|cue| cue.token_count() > 0)
                .cloned()
                .collect(),
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SubburnError::NotFound(format!("{}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> (Orchestrator, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.temp_dir = dir.path().join("tmp").to_string_lossy().to_string();
        (Orchestrator::new(settings).unwrap(), dir)
    }

    #[test]
    fn test_layout_config_scales_font() {
        let (orch, _dir) = orchestrator();
        let cfg = orch.layout_config(
            &LayoutOverrides::default(),
            &StyleSpec::default(),
            VideoDimensions {
                width: 3840,
                height: 2160,
            },
        );
        assert_eq!(cfg.font_size, 48);
        assert_eq!(cfg.max_lines, 2);
        assert!((cfg.max_width_percent - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_layout_config_overrides() {
        let (orch, _dir) = orchestrator();
        let overrides = LayoutOverrides {
            max_lines: Some(3),
            max_width_percent: Some(50.0),
            font_size: Some(40),
        };
        let cfg = orch.layout_config(
            &overrides,
            &StyleSpec::default(),
            VideoDimensions {
                width: 1920,
                height: 1080,
            },
        );
        assert_eq!(cfg.max_lines, 3);
        assert!((cfg.max_width_percent - 0.5).abs() < 1e-9);
        assert_eq!(cfg.font_size, 40);
    }

    #[test]
    fn test_layout_config_uses_style_font() {
        let (orch, _dir) = orchestrator();
        let style = StyleSpec::default().with_font_size(32);
        let canvas = VideoDimensions {
            width: 1920,
            height: 1080,
        };
        assert_eq!(orch.layout_config(&LayoutOverrides::default(), &style, canvas).font_size, 32);

        let overrides = LayoutOverrides {
            font_size: Some(20),
            ..LayoutOverrides::default()
        };
        assert_eq!(orch.layout_config(&overrides, &style, canvas).font_size, 20);
    }

    #[test]
    fn test_overrides_accept_client_field_names() {
        let overrides: LayoutOverrides =
            serde_json::from_str(r#"{"maxLines": 1, "maxWidth": 60, "fontSize": 30}"#).unwrap();
        assert_eq!(overrides.max_lines, Some(1));
        assert_eq!(overrides.max_width_percent, Some(60.0));
        assert_eq!(overrides.font_size, Some(30));
    }

    #[test]
    fn test_layout_builds_document() {
        let (orch, _dir) = orchestrator();
        let cfg = LayoutConfig::new(2, 0.7, 24, 1280, 720);
        let document = orch.layout(vec![RecognizedSpan::new(0.0, 1.0, "hello")], cfg);
        assert_eq!(document.cues.len(), 1);
        assert_eq!(document.spans.len(), 1);
    }

    #[test]
    fn test_prepared_cues_are_kept_as_given() {
        let cfg = LayoutConfig::new(1, 0.3, 40, 1920, 1080);
        let edited = vec![
            DisplayCue::new(0.0, 1.0, vec!["one two three four five six".into()], Vec::new()),
            DisplayCue::new(1.0, 2.0, vec!["  ".into()], Vec::new()),
        ];
        let cues = CueSource::Cues(&edited).into_cues(&cfg);
        assert_eq!(cues, vec![edited[0].clone()]);

        let spans = vec![RecognizedSpan::new(0.0, 1.0, "one two three four five six")];
        assert_eq!(CueSource::Spans(&spans).into_cues(&cfg).len(), 2);
    }

    #[tokio::test]
    async fn test_render_cues_missing_media_fails_job() {
        let (orch, dir) = orchestrator();
        let job = Uuid::new_v4();
        let cues = vec![DisplayCue::new(0.0, 1.0, vec!["hi".into()], Vec::new())];
        let result = orch
            .render_cues(
                Path::new("/nonexistent/video.mp4"),
                &cues,
                &StyleSpec::default(),
                &LayoutOverrides::default(),
                &dir.path().join("out.mp4"),
                Some(job),
            )
            .await;
        assert!(matches!(result, Err(SubburnError::NotFound(_))));
        assert_eq!(orch.jobs().get(&job).unwrap().status, JobState::Error);
    }

    #[tokio::test]
    async fn test_probe_canvas_falls_back() {
        let (orch, _dir) = orchestrator();
        let canvas = orch.probe_canvas(Path::new("/nonexistent/video.mp4")).await;
        assert_eq!(canvas, VideoDimensions { width: 1280, height: 720 });
    }

    #[tokio::test]
    async fn test_missing_media_marks_job_failed() {
        let (orch, _dir) = orchestrator();
        let job = Uuid::new_v4();
        let result = orch
            .transcribe_media(
                Path::new("/nonexistent/video.mp4"),
                &LayoutOverrides::default(),
                None,
                None,
                Some(job),
            )
            .await;

        assert!(matches!(result, Err(SubburnError::NotFound(_))));
        let status = orch.jobs().get(&job).unwrap();
        assert_eq!(status.status, JobState::Error);
    }
}
