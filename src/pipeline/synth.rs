//! Speech synthesis with bounded retry.
//!
//! ## Retry Strategy
//!
//! TTS backends fail transiently — accelerator out-of-memory, model
//! download hiccups, the occasional crashed vocoder. Each conversion gets a
//! fixed number of attempts (default 5) with a fixed inter-attempt delay
//! (default 10 s); both come from [`ConversionConfig`] so tests can run the
//! loop in milliseconds. The model itself is NOT reloaded between attempts:
//! the registry hands back the same cached handle, so retries only repeat
//! the cheap part.
//!
//! ## Artifact integrity
//!
//! Audio is written to a `.tmp` sibling and renamed into place, so a failed
//! attempt never leaves a partial WAV where a `Conversion` record could
//! point at it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ConversionConfig;
use crate::dispatch::Dispatcher;
use crate::error::ConvertError;
use crate::models::SpeechModel;
use crate::registry::{ModelHandle, ModelRegistry};

/// Registry of synthesis models, keyed by resolved model id.
pub type SpeechRegistry = ModelRegistry<dyn SpeechModel>;

/// Turns text into WAV artifacts under the configured audio directory.
pub struct Synthesizer {
    registry: Arc<SpeechRegistry>,
    dispatcher: Dispatcher,
    audio_dir: PathBuf,
    max_retries: u32,
    retry_delay: Duration,
}

impl Synthesizer {
    pub fn new(
        registry: Arc<SpeechRegistry>,
        dispatcher: Dispatcher,
        config: &ConversionConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            audio_dir: config.audio_dir.clone(),
            max_retries: config.max_synthesis_retries.max(1),
            retry_delay: config.synthesis_retry_delay,
        }
    }

    /// Synthesize speech and return the path of the new audio artifact.
    ///
    /// On success the returned file exists and is complete. On failure no
    /// artifact is left behind and the error wraps the final attempt's
    /// cause.
    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        speaker: Option<&str>,
    ) -> Result<PathBuf, ConvertError> {
        tokio::fs::create_dir_all(&self.audio_dir)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: format!(
                    "failed to create audio dir '{}': {e}",
                    self.audio_dir.display()
                ),
            })?;

        let mut last_err: Option<ConvertError> = None;
        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                sleep(self.retry_delay).await;
            }
            match self.attempt(text, language, speaker).await {
                Ok(path) => {
                    info!(
                        "synthesized {} chars of '{}' speech to {} (attempt {})",
                        text.len(),
                        language,
                        path.display(),
                        attempt
                    );
                    return Ok(path);
                }
                Err(e) => {
                    warn!(
                        "synthesis attempt {}/{} failed: {e}",
                        attempt, self.max_retries
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(ConvertError::Synthesis {
            attempts: self.max_retries,
            cause: Box::new(last_err.unwrap_or_else(|| {
                ConvertError::Internal("no synthesis attempt was made".to_string())
            })),
        })
    }

    async fn attempt(
        &self,
        text: &str,
        language: &str,
        speaker: Option<&str>,
    ) -> Result<PathBuf, ConvertError> {
        // Acquisition is inside the attempt so a failed *load* is retried
        // too; a cached model is returned instantly on later attempts.
        let handle = self.registry.acquire(language).await?;

        let path = self
            .audio_dir
            .join(format!("audio_{}_{}.wav", language, Uuid::new_v4()));

        let text = text.to_string();
        let speaker = speaker.map(str::to_string);
        let out = path.clone();
        self.dispatcher
            .dispatch(move || write_speech(&handle, &text, speaker.as_deref(), &out))
            .await??;

        Ok(path)
    }
}

/// Blocking: run the model and write the WAV atomically.
fn write_speech(
    handle: &Arc<ModelHandle<dyn SpeechModel>>,
    text: &str,
    speaker: Option<&str>,
    path: &Path,
) -> Result<(), ConvertError> {
    let audio = handle
        .with_model(|m| m.synthesize(text, speaker))
        .map_err(|cause| ConvertError::Inference { cause })?;

    let tmp = path.with_extension("wav.tmp");
    if let Err(e) = audio.write_wav(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(ConvertError::Storage {
            detail: format!("failed to write audio file: {e}"),
        });
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ConvertError::Storage {
            detail: format!("failed to finalize audio file: {e}"),
        }
    })
}
