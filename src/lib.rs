//! # doc2audio
//!
//! Convert documents, images, and raw text into narrated audio.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────┐   ┌──────────┐   ┌─────────────┐   ┌─────────┐   ┌─────────┐
//! │ upload │──▶│ extract  │──▶│ (summarize) │──▶│  synth  │──▶│ persist │
//! │ staged │   │ pdfium + │   │ collaborator│   │ TTS +   │   │ record +│
//! │ bytes  │   │   OCR    │   │   (opt-in)  │   │ WAV     │   │ artifact│
//! └────────┘   └──────────┘   └─────────────┘   └─────────┘   └─────────┘
//! ```
//!
//! PDFs are walked page by page; each page contributes its embedded text
//! followed by the recognized text of its embedded images, joined in
//! document order regardless of how recognition jobs complete. Standalone
//! images go straight to recognition; text input skips extraction entirely.
//!
//! Model backends (OCR, TTS) are external collaborators behind the
//! [`models::TextRecognizer`] and [`models::SpeechModel`] traits. They are
//! blocking and expensive, so every backend call runs on a bounded
//! [`dispatch::Dispatcher`] and every loaded model is cached per language
//! key in a [`registry::ModelRegistry`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doc2audio::{
//!     ConversionConfig, ConversionRequest, ConversionService, MemoryStore, Source,
//! };
//! # use doc2audio::{ModelLoader, TextRecognizer, SpeechModel};
//! # fn loaders() -> (
//! #     Arc<dyn ModelLoader<dyn TextRecognizer>>,
//! #     Arc<dyn ModelLoader<dyn SpeechModel>>,
//! # ) { unimplemented!() }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (recognizers, speech) = loaders();
//! let service = ConversionService::new(
//!     ConversionConfig::default(),
//!     recognizers,
//!     speech,
//!     Arc::new(MemoryStore::new()),
//!     None,
//! );
//!
//! let owner = uuid::Uuid::new_v4();
//! let record = service
//!     .convert(
//!         owner,
//!         ConversionRequest {
//!             source: Source::Text { text: "Hello, world".into() },
//!             language: "en".into(),
//!             speaker: None,
//!             summary: None,
//!         },
//!     )
//!     .await?;
//! println!("narrated to {}", record.audio_file_path.display());
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod store;
pub mod summarize;

pub use audio::{AudioArtifact, AudioChunk, ByteRange};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{ConversionRequest, ConversionService, Source, IMAGE_EXTENSIONS};
pub use dispatch::Dispatcher;
pub use error::{ConvertError, ErrorCategory, ModelError};
pub use models::{SpeechAudio, SpeechModel, TextRecognizer};
pub use pipeline::extract::{Extraction, Extractor, RecognizerRegistry};
pub use pipeline::synth::{SpeechRegistry, Synthesizer};
pub use registry::{ModelHandle, ModelLoader, ModelRegistry};
pub use store::{Conversion, ConversionStore, MemoryStore, SourceKind, StoreError};
pub use summarize::{SummarizeError, Summarizer, SummaryStyle};
