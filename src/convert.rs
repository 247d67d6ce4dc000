//! The conversion orchestrator.
//!
//! [`ConversionService`] wires the pipeline stages together and owns every
//! cross-cutting policy: input validation, upload staging and cleanup,
//! optional summarization, persistence, and per-record ownership checks.
//! Each public method corresponds to one operation an embedder exposes.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::AudioArtifact;
use crate::config::ConversionConfig;
use crate::dispatch::Dispatcher;
use crate::error::ConvertError;
use crate::models::{SpeechModel, TextRecognizer};
use crate::pipeline::extract::{Extraction, Extractor, RecognizerRegistry};
use crate::pipeline::synth::{SpeechRegistry, Synthesizer};
use crate::registry::ModelLoader;
use crate::store::{Conversion, ConversionStore, SourceKind};
use crate::summarize::{Summarizer, SummaryStyle};

/// File extensions accepted for image sources, lowercase with the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".webp"];

/// The payload of one conversion.
#[derive(Debug, Clone)]
pub enum Source {
    /// A PDF document, uploaded as raw bytes.
    Pdf { file_name: String, bytes: Vec<u8> },
    /// A raster image, uploaded as raw bytes.
    Image { file_name: String, bytes: Vec<u8> },
    /// Text supplied directly, narrated verbatim.
    Text { text: String },
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Pdf { .. } => SourceKind::Pdf,
            Source::Image { .. } => SourceKind::Image,
            Source::Text { .. } => SourceKind::Text,
        }
    }
}

/// One conversion request, as received from the caller.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: Source,
    /// Recognition and narration language code (e.g. "en", "de").
    pub language: String,
    /// Speaker id for multi-speaker synthesis models.
    pub speaker: Option<String>,
    /// When set, the extracted text is condensed before narration.
    pub summary: Option<SummaryStyle>,
}

/// Orchestrates the full document-to-audio pipeline.
pub struct ConversionService {
    config: ConversionConfig,
    dispatcher: Dispatcher,
    extractor: Extractor,
    synthesizer: Synthesizer,
    store: Arc<dyn ConversionStore>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl ConversionService {
    pub fn new(
        config: ConversionConfig,
        recognizer_loader: Arc<dyn ModelLoader<dyn TextRecognizer>>,
        speech_loader: Arc<dyn ModelLoader<dyn SpeechModel>>,
        store: Arc<dyn ConversionStore>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        let dispatcher = Dispatcher::new(config.dispatcher_workers);
        let recognizers = Arc::new(RecognizerRegistry::new(
            "recognition",
            recognizer_loader,
            dispatcher.clone(),
        ));
        let speech = Arc::new(SpeechRegistry::new(
            "synthesis",
            speech_loader,
            dispatcher.clone(),
        ));
        let extractor = Extractor::new(recognizers, dispatcher.clone(), config.page_concurrency);
        let synthesizer = Synthesizer::new(speech, dispatcher.clone(), &config);
        Self {
            config,
            dispatcher,
            extractor,
            synthesizer,
            store,
            summarizer,
        }
    }

    /// Run one conversion end to end and persist the resulting record.
    pub async fn convert(
        &self,
        owner: Uuid,
        request: ConversionRequest,
    ) -> Result<Conversion, ConvertError> {
        validate(&request)?;
        let kind = request.source.kind();
        info!("starting {} conversion for language '{}'", kind, request.language);
        if !crate::catalog::is_synthesis_supported(&request.language) {
            debug!(
                "no dedicated synthesis model for '{}'; narration uses the multilingual fallback",
                request.language
            );
        }

        let (extraction, file_name) = match &request.source {
            // Text is carried verbatim; validation already rejected blank
            // input, and the caller's exact wording is what gets narrated.
            Source::Text { text } => (
                Extraction {
                    text: text.clone(),
                    language: request.language.clone(),
                },
                // Named after the audio artifact, once it exists.
                None,
            ),
            Source::Pdf { file_name, bytes } | Source::Image { file_name, bytes } => {
                let staged = self.stage(bytes.clone()).await?;
                let result = match kind {
                    SourceKind::Pdf => {
                        self.extractor
                            .extract_from_pdf(staged.path(), &request.language)
                            .await
                    }
                    _ => {
                        self.extractor
                            .extract_from_image(staged.path(), &request.language)
                            .await
                    }
                };
                // Explicit close surfaces cleanup errors; the RAII drop
                // still covers the early-return paths above.
                if let Err(e) = staged.close() {
                    warn!("failed to remove staged upload: {e}");
                }
                (result?, Some(file_name.clone()))
            }
        };

        let narration = self.maybe_summarize(&extraction, request.summary).await;

        let audio_path = self
            .synthesizer
            .synthesize(&narration, &request.language, request.speaker.as_deref())
            .await?;

        let file_name = file_name.unwrap_or_else(|| {
            let stem = audio_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("text_input_{stem}")
        });

        let conversion = Conversion {
            id: Uuid::new_v4(),
            file_name,
            language: request.language,
            source_type: kind,
            text_content: extraction.text,
            audio_file_path: audio_path.clone(),
            created_at: chrono::Utc::now(),
            user_id: owner,
        };

        if let Err(e) = self.store.create(conversion.clone()).await {
            // The record is the only thing that references the artifact, so
            // an unrecorded artifact must not survive.
            if let Err(remove_err) = tokio::fs::remove_file(&audio_path).await {
                warn!("failed to remove orphaned audio artifact: {remove_err}");
            }
            return Err(ConvertError::Storage {
                detail: format!("failed to persist conversion record: {e}"),
            });
        }

        info!("conversion {} complete: {}", conversion.id, conversion.file_name);
        Ok(conversion)
    }

    /// Fetch a record, enforcing ownership.
    pub async fn get(&self, id: Uuid, owner: Uuid) -> Result<Conversion, ConvertError> {
        let record = self
            .store
            .get(id)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: e.to_string(),
            })?
            .ok_or(ConvertError::NotFound { id })?;
        if record.user_id != owner {
            return Err(ConvertError::Forbidden { id });
        }
        Ok(record)
    }

    /// List the owner's records in creation order, with offset pagination.
    pub async fn list(
        &self,
        owner: Uuid,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Conversion>, ConvertError> {
        self.store
            .list_by_owner(owner, skip, limit)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: e.to_string(),
            })
    }

    /// Delete a record and its audio artifact, enforcing ownership.
    ///
    /// The artifact is removed first; a record pointing at a missing file
    /// is recoverable (delete again), the reverse is an orphaned file
    /// nothing references. A missing artifact is tolerated so a previously
    /// interrupted delete can complete.
    pub async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), ConvertError> {
        let record = self.get(id, owner).await?;

        match tokio::fs::remove_file(&record.audio_file_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("audio artifact for {} already missing", id);
            }
            Err(e) => {
                return Err(ConvertError::Storage {
                    detail: format!("failed to remove audio artifact: {e}"),
                });
            }
        }

        self.store
            .delete(id)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: e.to_string(),
            })?;
        info!("conversion {} deleted", id);
        Ok(())
    }

    /// Open a record's audio artifact for reading, enforcing ownership.
    pub async fn audio(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<(Conversion, AudioArtifact), ConvertError> {
        let record = self.get(id, owner).await?;
        let artifact = AudioArtifact::open(&record.audio_file_path).await?;
        Ok((record, artifact))
    }

    /// Condense the extracted text when a summary was requested.
    ///
    /// Summarization is best-effort: on failure or an empty result the
    /// original text is narrated instead, so a flaky summarizer degrades
    /// the conversion rather than failing it.
    async fn maybe_summarize(&self, extraction: &Extraction, style: Option<SummaryStyle>) -> String {
        let (summarizer, style) = match (&self.summarizer, style) {
            (Some(s), Some(style)) => (s, style),
            _ => return extraction.text.clone(),
        };

        let input: String = extraction
            .text
            .chars()
            .take(self.config.max_summary_chars)
            .collect();

        match summarizer
            .summarize(&input, &extraction.language, style)
            .await
        {
            Ok(summary) if !summary.trim().is_empty() => {
                info!(
                    "summarized {} chars to {} chars ({})",
                    input.len(),
                    summary.len(),
                    style
                );
                summary
            }
            Ok(_) => {
                warn!("summarizer returned empty text; narrating the original");
                extraction.text.clone()
            }
            Err(e) => {
                warn!("summarization failed ({e}); narrating the original");
                extraction.text.clone()
            }
        }
    }

    /// Write uploaded bytes to a temp file under the upload dir.
    async fn stage(&self, bytes: Vec<u8>) -> Result<NamedTempFile, ConvertError> {
        let dir = self.config.upload_dir.clone();
        self.dispatcher
            .dispatch(move || write_staged(&dir, &bytes))
            .await?
    }
}

fn write_staged(dir: &Path, bytes: &[u8]) -> Result<NamedTempFile, ConvertError> {
    use std::io::Write;

    std::fs::create_dir_all(dir).map_err(|e| ConvertError::Storage {
        detail: format!("failed to create upload dir '{}': {e}", dir.display()),
    })?;
    let mut file = NamedTempFile::new_in(dir).map_err(|e| ConvertError::Storage {
        detail: format!("failed to stage upload: {e}"),
    })?;
    file.write_all(bytes).map_err(|e| ConvertError::Storage {
        detail: format!("failed to write staged upload: {e}"),
    })?;
    file.flush().map_err(|e| ConvertError::Storage {
        detail: format!("failed to flush staged upload: {e}"),
    })?;
    Ok(file)
}

/// Reject requests that cannot possibly convert.
fn validate(request: &ConversionRequest) -> Result<(), ConvertError> {
    let kind = request.source.kind();
    if request.language.trim().is_empty() {
        return Err(ConvertError::Validation {
            kind,
            detail: "language must not be empty".to_string(),
        });
    }

    match &request.source {
        Source::Pdf { file_name, bytes } => {
            if !has_extension(file_name, &[".pdf"]) {
                return Err(ConvertError::Validation {
                    kind,
                    detail: format!("'{file_name}' is not a .pdf file"),
                });
            }
            if bytes.is_empty() {
                return Err(ConvertError::Validation {
                    kind,
                    detail: "uploaded file is empty".to_string(),
                });
            }
        }
        Source::Image { file_name, bytes } => {
            if !has_extension(file_name, IMAGE_EXTENSIONS) {
                return Err(ConvertError::Validation {
                    kind,
                    detail: format!(
                        "'{file_name}' is not a supported image ({})",
                        IMAGE_EXTENSIONS.join(", ")
                    ),
                });
            }
            if bytes.is_empty() {
                return Err(ConvertError::Validation {
                    kind,
                    detail: "uploaded file is empty".to_string(),
                });
            }
        }
        Source::Text { text } => {
            if text.trim().is_empty() {
                return Err(ConvertError::Validation {
                    kind,
                    detail: "text must not be empty".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn has_extension(file_name: &str, allowed: &[&str]) -> bool {
    let lower = file_name.to_lowercase();
    allowed.iter().any(|ext| lower.ends_with(ext))
}
