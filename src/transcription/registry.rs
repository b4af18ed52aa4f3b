//! The currently loaded transcription model.
//!
//! Only one model is kept at a time. Requests naming another model swap it
//! under the lock; requests for the loaded one share it.

use super::{LocalWhisperTranscriber, OpenAITranscriber, Transcriber};
use crate::config::{TranscriptionProvider, TranscriptionSettings};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

struct LoadedModel {
    name: String,
    transcriber: Arc<dyn Transcriber>,
}

/// Owner of the single long-lived transcriber instance.
pub struct ModelRegistry {
    settings: TranscriptionSettings,
    current: Mutex<Option<LoadedModel>>,
}

impl ModelRegistry {
    pub fn new(settings: TranscriptionSettings) -> Self {
        Self {
            settings,
            current: Mutex::new(None),
        }
    }

    /// Registry with a transcriber already loaded under `name`.
    pub fn with_transcriber(
        settings: TranscriptionSettings,
        name: &str,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            settings,
            current: Mutex::new(Some(LoadedModel {
                name: name.to_string(),
                transcriber,
            })),
        }
    }

    /// Return the transcriber for `model` (or the configured default),
    /// loading it if another model is current.
    pub async fn acquire(&self, model: Option<&str>) -> Result<Arc<dyn Transcriber>> {
        let name = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_model());

        let mut current = self.current.lock().await;
        if let Some(loaded) = current.as_ref() {
            if loaded.name == name {
                return Ok(loaded.transcriber.clone());
            }
        }

        info!("Loading transcription model {} ({})", name, self.settings.provider);
        let transcriber = self.load(name)?;
        *current = Some(LoadedModel {
            name: name.to_string(),
            transcriber: transcriber.clone(),
        });
        Ok(transcriber)
    }

    /// Name of the loaded model, if any.
    pub async fn current_model(&self) -> Option<String> {
        self.current.lock().await.as_ref().map(|m| m.name.clone())
    }

    fn load(&self, name: &str) -> Result<Arc<dyn Transcriber>> {
        Ok(match self.settings.provider {
            TranscriptionProvider::OpenAI => Arc::new(OpenAITranscriber::with_config(
                name,
                self.settings.chunk_duration_seconds,
                self.settings.max_concurrent_chunks,
            )?),
            TranscriptionProvider::Local => Arc::new(LocalWhisperTranscriber::new(
                &self.settings.local_command,
                name,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_settings() -> TranscriptionSettings {
        TranscriptionSettings {
            provider: TranscriptionProvider::Local,
            ..TranscriptionSettings::default()
        }
    }

    #[tokio::test]
    async fn test_acquire_reuses_loaded_model() {
        let registry = ModelRegistry::new(local_settings());
        assert_eq!(registry.current_model().await, None);

        let first = registry.acquire(None).await.unwrap();
        let second = registry.acquire(Some("base")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.current_model().await.as_deref(), Some("base"));
    }

    #[test]
    fn test_preloaded_transcriber_is_shared() {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(LocalWhisperTranscriber::new("whisper", "medium"));
        let registry =
            ModelRegistry::with_transcriber(local_settings(), "medium", transcriber.clone());

        let acquired = tokio_test::block_on(registry.acquire(Some("medium"))).unwrap();
        assert!(Arc::ptr_eq(&acquired, &transcriber));
    }

    #[tokio::test]
    async fn test_acquire_swaps_model_by_name() {
        let registry = ModelRegistry::new(local_settings());
        let base = registry.acquire(Some("base")).await.unwrap();
        let small = registry.acquire(Some("small")).await.unwrap();
        assert!(!Arc::ptr_eq(&base, &small));
        assert_eq!(small.model(), "small");
        assert_eq!(registry.current_model().await.as_deref(), Some("small"));
    }

    #[tokio::test]
    async fn test_blank_model_uses_default() {
        let registry = ModelRegistry::new(local_settings());
        let transcriber = registry.acquire(Some("  ")).await.unwrap();
        assert_eq!(transcriber.model(), "base");
    }

    #[tokio::test]
    async fn test_concurrent_acquire_shares_instance() {
        let registry = Arc::new(ModelRegistry::new(local_settings()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.acquire(Some("tiny")).await.unwrap() })
            })
            .collect();

        let mut loaded = Vec::new();
        for handle in handles {
            loaded.push(handle.await.unwrap());
        }
        assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
