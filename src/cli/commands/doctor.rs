//! Doctor command - verify system requirements and configuration.

use crate::cli::{preflight, Output};
use crate::config::{Settings, TranscriptionProvider};
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Subburn Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check external tools
    println!("{}", style("External Tools").bold());
    let tool_checks = vec![
        check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg()),
        check_tool("ffprobe", "ffprobe -version", install_hint_ffmpeg()),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    // Check the configured recognizer
    println!("{}", style("Transcription").bold());
    let recognizer_check = check_transcription(settings);
    recognizer_check.print();
    checks.push(recognizer_check);

    println!();

    // Check directories
    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Subburn.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! Subburn is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            // Try to extract version from first line
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            // Truncate long version strings
            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check the recognizer selected by `transcription.provider`.
fn check_transcription(settings: &Settings) -> CheckResult {
    let transcription = &settings.transcription;
    match transcription.provider {
        TranscriptionProvider::OpenAI => check_openai_api_key(&transcription.model),
        TranscriptionProvider::Local => {
            let name = format!("{} ({})", transcription.local_command, transcription.local_model);
            match preflight::check_tool(&transcription.local_command) {
                Ok(()) => CheckResult::ok(&name, "available"),
                Err(_) => CheckResult::error(
                    &name,
                    "not found",
                    "Install with: pip install openai-whisper (or set transcription.provider = \"openai\")",
                ),
            }
        }
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key(model: &str) -> CheckResult {
    let name = format!("OPENAI_API_KEY ({})", model);
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(&name, &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            &name,
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            &name,
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            &name,
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...' (or use transcription.provider = \"local\")",
        ),
    }
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [
        ("Data directory", settings.data_dir()),
        ("Temp directory", settings.temp_dir()),
        ("Uploads", settings.upload_dir()),
        ("Rendered videos", settings.output_dir()),
    ]
    .into_iter()
    .map(|(name, dir)| check_directory(name, &dir))
    .collect()
}

fn check_directory(name: &str, dir: &Path) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warning(
            name,
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        );
    }

    let size = dir_size(dir);
    CheckResult::ok(name, &format!("{} ({})", dir.display(), format_size(size)))
}

/// Total size of the files directly inside `dir`.
fn dir_size(dir: &Path) -> u64 {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.metadata().ok())
                .filter(|m| m.is_file())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0)
}

/// Check if config file exists and parses.
fn check_config_file(config_path: &Path) -> CheckResult {
    if !config_path.exists() {
        return CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: subburn init (or subburn config edit)",
        );
    }

    match Settings::load_from(Some(&config_path.to_path_buf())) {
        Ok(_) => CheckResult::ok("Config file", &format!("{}", config_path.display())),
        Err(e) => CheckResult::error(
            "Config file",
            &format!("{} does not parse", config_path.display()),
            &e.to_string(),
        ),
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_config_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_config_file(&dir.path().join("absent.toml"));
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[test]
    fn test_broken_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[layout]\nmax_lines = \"two\"\n").unwrap();
        assert_eq!(check_config_file(&path).status, CheckStatus::Error);
    }

    #[test]
    fn test_directory_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ass"), vec![0u8; 2048]).unwrap();
        let result = check_directory("Data", dir.path());
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.message.contains("2.0 KB"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
