//! Configuration settings for Subburn.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SubburnError};
use crate::markup::StyleSpec;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub layout: LayoutSettings,
    /// Default subtitle style for `render` and `create-video`.
    pub style: StyleSpec,
    pub media: MediaSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for uploads and rendered videos.
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.subburn".to_string(),
            temp_dir: "/tmp/subburn".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Transcription provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// OpenAI transcription API.
    #[default]
    OpenAI,
    /// A locally installed `whisper` command.
    Local,
}

impl std::str::FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "api" => Ok(TranscriptionProvider::OpenAI),
            "local" | "whisper" => Ok(TranscriptionProvider::Local),
            _ => Err(format!("Unknown transcription provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionProvider::OpenAI => write!(f, "openai"),
            TranscriptionProvider::Local => write!(f, "local"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription provider (openai, local).
    pub provider: TranscriptionProvider,
    /// Model name for the OpenAI provider.
    pub model: String,
    /// Model name passed to the local whisper command.
    pub local_model: String,
    /// Executable for the local provider.
    pub local_command: String,
    /// Language hint (ISO 639-1). None lets the recognizer detect it.
    pub language: Option<String>,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent chunk processing.
    pub max_concurrent_chunks: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::OpenAI,
            model: "whisper-1".to_string(),
            local_model: "base".to_string(),
            local_command: "whisper".to_string(),
            language: None,
            chunk_duration_seconds: 600,
            max_concurrent_chunks: 3,
        }
    }
}

impl TranscriptionSettings {
    /// Model used when a request does not name one.
    pub fn default_model(&self) -> &str {
        match self.provider {
            TranscriptionProvider::OpenAI => &self.model,
            TranscriptionProvider::Local => &self.local_model,
        }
    }
}

/// Subtitle layout defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Maximum lines per cue.
    pub max_lines: usize,
    /// Fraction (or percentage) of the video width used for text.
    pub max_width_percent: f64,
    /// Scale the style's font size to the probed video width.
    pub scale_font_to_video: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            max_lines: 2,
            max_width_percent: 0.7,
            scale_font_to_video: true,
        }
    }
}

/// Media tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Canvas size used when a file cannot be probed.
    pub fallback_width: u32,
    pub fallback_height: u32,
    /// x264 preset for burned-in output.
    pub preset: String,
    /// File extensions accepted for upload.
    pub allowed_extensions: Vec<String>,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            fallback_width: 1280,
            fallback_height: 720,
            preset: "fast".to_string(),
            allowed_extensions: ["mp4", "avi", "mov", "mkv", "webm", "mp3", "wav"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl MediaSettings {
    pub fn is_allowed(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_mb: 2048,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SubburnError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set a dotted key such as `layout.max_lines` from a string value.
    ///
    /// The value is read as a TOML literal when possible (numbers, booleans),
    /// otherwise as a string. The result must still form valid settings.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut root = toml::Value::try_from(&*self)
            .map_err(|e| SubburnError::Config(e.to_string()))?;

        let parts: Vec<&str> = key.split('.').collect();
        let (last, sections) = parts
            .split_last()
            .ok_or_else(|| SubburnError::Config("Empty key".to_string()))?;

        let mut table = root
            .as_table_mut()
            .ok_or_else(|| SubburnError::Config("Settings are not a table".to_string()))?;
        for section in sections {
            table = table
                .get_mut(*section)
                .and_then(toml::Value::as_table_mut)
                .ok_or_else(|| SubburnError::Config(format!("Unknown section: {}", section)))?;
        }

        // Optional fields are omitted from the serialized table, so only
        // reject keys in sections that are fully known.
        if !table.contains_key(*last) && !is_optional_key(key) {
            return Err(SubburnError::Config(format!("Unknown key: {}", key)));
        }
        table.insert(last.to_string(), parse_toml_literal(value));

        *self = root
            .try_into::<Settings>()
            .map_err(|e| SubburnError::Config(e.to_string()))?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subburn")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Where uploaded media is stored.
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir().join("uploads")
    }

    /// Where rendered videos are written.
    pub fn output_dir(&self) -> PathBuf {
        self.data_dir().join("processed")
    }
}

fn is_optional_key(key: &str) -> bool {
    matches!(key, "transcription.language" | "style.use_karaoke")
}

fn parse_toml_literal(value: &str) -> toml::Value {
    if let Ok(b) = value.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = value.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = value.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Anchor;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcription.provider, TranscriptionProvider::OpenAI);
        assert_eq!(settings.transcription.default_model(), "whisper-1");
        assert_eq!(settings.layout.max_lines, 2);
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.media.fallback_width, 1280);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [layout]
            max_lines = 3

            [style]
            position = "top"
            "#,
        )
        .unwrap();
        assert_eq!(settings.layout.max_lines, 3);
        assert_eq!(settings.style.font_size, 24);
        assert_eq!(settings.style.position, Anchor::Top);
        assert_eq!(settings.general.log_level, "warn");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.transcription.provider = TranscriptionProvider::Local;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.transcription.provider, TranscriptionProvider::Local);
        assert_eq!(loaded.transcription.default_model(), "base");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = PathBuf::from("/nonexistent/subburn/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_set_value() {
        let mut settings = Settings::default();
        settings.set_value("layout.max_lines", "3").unwrap();
        settings.set_value("layout.max_width_percent", "0.5").unwrap();
        settings.set_value("transcription.provider", "local").unwrap();
        settings.set_value("transcription.language", "ro").unwrap();
        settings.set_value("style.glow", "true").unwrap();

        assert_eq!(settings.layout.max_lines, 3);
        assert_eq!(settings.layout.max_width_percent, 0.5);
        assert_eq!(settings.transcription.provider, TranscriptionProvider::Local);
        assert_eq!(settings.transcription.language.as_deref(), Some("ro"));
        assert!(settings.style.glow);
    }

    #[test]
    fn test_set_value_rejects_unknown_keys_and_bad_types() {
        let mut settings = Settings::default();
        assert!(settings.set_value("layout.nope", "1").is_err());
        assert!(settings.set_value("nope.max_lines", "1").is_err());
        assert!(settings.set_value("layout.max_lines", "many").is_err());
        assert_eq!(settings.layout.max_lines, 2);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(
            "openai".parse::<TranscriptionProvider>().unwrap(),
            TranscriptionProvider::OpenAI
        );
        assert_eq!(
            "whisper".parse::<TranscriptionProvider>().unwrap(),
            TranscriptionProvider::Local
        );
        assert!("vosk".parse::<TranscriptionProvider>().is_err());
    }

    #[test]
    fn test_allowed_extensions() {
        let media = MediaSettings::default();
        assert!(media.is_allowed("clip.MP4"));
        assert!(media.is_allowed("talk.final.wav"));
        assert!(!media.is_allowed("notes.txt"));
        assert!(!media.is_allowed("noext"));
    }
}
