//! ffmpeg invocations: audio extraction, chunking and subtitle burn-in.

use crate::error::{Result, SubburnError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

use super::probe::probe_duration;

/// Sample rate expected by speech recognizers.
const SPEECH_SAMPLE_RATE: &str = "16000";

/// Extract the audio track as 16 kHz mono PCM WAV.
#[instrument(fields(source = %source.display()))]
pub async fn extract_audio(source: &Path, dest: &Path) -> Result<()> {
    debug!("Extracting audio to {:?}", dest);

    let mut command = Command::new("ffmpeg");
    command
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg(SPEECH_SAMPLE_RATE)
        .arg("-ac").arg("1")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest);

    run_ffmpeg(&mut command, "Audio extraction").await
}

/// Segments a long audio file into smaller chunks for processing.
///
/// Each chunk will be approximately `chunk_seconds` long. Returns tuples of
/// (chunk_path, offset_seconds) for each segment.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds.max(1) as f64;

    // Short audio doesn't need splitting
    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut segments = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let segment_path = output_dir.join(format!("{}_{:04}.wav", base_name, idx));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // First attempt: stream copy
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    warn!("Stream copy failed, re-encoding segment");

    let mut command = Command::new("ffmpeg");
    command
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg(SPEECH_SAMPLE_RATE)
        .arg("-ac").arg("1")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest);

    run_ffmpeg(&mut command, "Segment extraction").await
}

/// Burn an ASS subtitle file into a video, keeping the audio stream.
///
/// `on_progress` receives the encoded fraction in `[0, 1]` when the input
/// duration is known.
#[instrument(skip(on_progress), fields(input = %input.display()))]
pub async fn burn_subtitles(
    input: &Path,
    subtitles: &Path,
    output: &Path,
    preset: &str,
    on_progress: impl Fn(f64) + Send,
) -> Result<()> {
    let duration = match probe_duration(input).await {
        Ok(d) if d > 0.0 => Some(d),
        Ok(_) => None,
        Err(e) => {
            warn!("Could not probe duration, progress unavailable: {}", e);
            None
        }
    };

    info!("Burning subtitles into {:?}", output);

    let spawned = Command::new("ffmpeg")
        .arg("-i").arg(input)
        .arg("-vf").arg(format!("ass={}", escape_filter_path(subtitles)))
        .arg("-c:a").arg("copy")
        .arg("-preset").arg(preset)
        .arg("-progress").arg("pipe:1")
        .arg("-nostats")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match spawned {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SubburnError::ToolNotFound("ffmpeg".into()));
        }
        Err(e) => return Err(SubburnError::ToolFailed(format!("ffmpeg error: {e}"))),
    };

    supervise_encoder(child, duration, &on_progress).await?;
    on_progress(1.0);
    Ok(())
}

/// Follow a running encoder's `-progress` output until it exits. The child
/// is killed if its output cannot be read.
async fn supervise_encoder(
    mut child: Child,
    duration: Option<f64>,
    on_progress: &(impl Fn(f64) + Send),
) -> Result<()> {
    // Drain stderr concurrently so a chatty encoder cannot block on a full pipe.
    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let (Some(total), Some(done)) = (duration, parse_progress_line(&line)) {
                        on_progress((done / total).clamp(0.0, 1.0));
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Lost encoder progress output, stopping ffmpeg: {}", e);
                    if let Err(kill_err) = child.kill().await {
                        warn!("Failed to kill ffmpeg: {}", kill_err);
                    }
                    if let Some(task) = stderr_task {
                        task.abort();
                    }
                    return Err(e.into());
                }
            }
        }
    }

    let status = child.wait().await?;
    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    if !status.success() {
        return Err(SubburnError::ToolFailed(format!(
            "ffmpeg exited with {}: {}",
            status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Seconds encoded so far, from one `-progress` output line.
fn parse_progress_line(line: &str) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // Both keys are reported in microseconds.
        "out_time_us" | "out_time_ms" => value
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .map(|us| us as f64 / 1_000_000.0),
        _ => None,
    }
}

/// Quote a path for use as a filter option value.
fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", raw.replace('\'', "'\\''").replace(':', "\\:"))
}

async fn run_ffmpeg(command: &mut Command, what: &str) -> Result<()> {
    let result = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SubburnError::ToolFailed(format!("{what} failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SubburnError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(SubburnError::ToolFailed(format!("ffmpeg error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_progress_line("out_time_us=2500000"), Some(2.5));
        assert_eq!(parse_progress_line("out_time_ms=1000000"), Some(1.0));
        assert_eq!(parse_progress_line("out_time_us=N/A"), None);
        assert_eq!(parse_progress_line("out_time_us=-9223372036854775807"), None);
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("garbage"), None);
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(
            escape_filter_path(Path::new("/tmp/subburn/job/subs.ass")),
            "'/tmp/subburn/job/subs.ass'"
        );
        assert_eq!(
            escape_filter_path(Path::new("/tmp/a:b/subs.ass")),
            "'/tmp/a\\:b/subs.ass'"
        );
    }

    fn spawn_sh(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    #[tokio::test]
    async fn test_supervise_reports_progress() {
        let child = spawn_sh("echo out_time_us=1000000; echo out_time_us=2000000; echo progress=end");
        let seen = std::sync::Mutex::new(Vec::new());
        supervise_encoder(child, Some(4.0), &|f: f64| seen.lock().unwrap().push(f))
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.5]);
    }

    #[tokio::test]
    async fn test_supervise_nonzero_exit_fails() {
        let child = spawn_sh("echo broken >&2; exit 3");
        let result = supervise_encoder(child, None, &|_: f64| {}).await;
        match result {
            Err(SubburnError::ToolFailed(msg)) => assert!(msg.contains("broken")),
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_unreadable_output_kills_encoder() {
        // Invalid UTF-8 on stdout, then a process that would outlive the test.
        let child = spawn_sh("printf '\\377\\n'; exec sleep 30");
        let pid = child.id().unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            supervise_encoder(child, Some(10.0), &|_: f64| {}),
        )
        .await
        .expect("supervisor should return without waiting for the encoder");

        assert!(result.is_err());
        assert!(!Path::new(&format!("/proc/{}", pid)).exists());
    }

    #[tokio::test]
    async fn test_extract_audio_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_audio(
            Path::new("/nonexistent/input.mp4"),
            &dir.path().join("out.wav"),
        )
        .await;
        assert!(result.is_err());
    }
}
