//! Error types for the doc2audio library.
//!
//! One crate-level error enum, [`ConvertError`], covers the whole pipeline.
//! Collaborators own their error surfaces ([`ModelError`] for model backends,
//! [`crate::store::StoreError`] for persistence,
//! [`crate::summarize::SummarizeError`] for summarization) and are wrapped
//! here at the seam where they enter the pipeline.
//!
//! Every variant maps to a stable [`ErrorCategory`] so callers can branch
//! between "fix your input", "retry later", and "not authorized" without
//! matching on individual variants.

use thiserror::Error;
use uuid::Uuid;

use crate::store::SourceKind;

/// Error produced by a model backend (loading or inference).
///
/// Backends are external collaborators behind the
/// [`crate::models::TextRecognizer`] and [`crate::models::SpeechModel`]
/// traits, so their failures arrive as an opaque message.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ModelError(pub String);

impl ModelError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// All errors returned by the doc2audio pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The source kind and the supplied payload do not match
    /// (wrong file extension, empty text).
    #[error("invalid {kind} input: {detail}")]
    Validation { kind: SourceKind, detail: String },

    /// The source could not be read at all (corrupt PDF, undecodable image).
    #[error("failed to extract text: {detail}")]
    Extraction { detail: String },

    /// Extraction succeeded structurally but produced only whitespace.
    ///
    /// Distinct from [`ConvertError::Extraction`]: the input was valid, it
    /// just carries no usable content. Callers should tell the user to pick
    /// a different source rather than retry.
    #[error("the source contained no extractable text")]
    NoTextFound,

    // ── Model errors ──────────────────────────────────────────────────────
    /// Constructing a model for the given cache key failed.
    #[error("failed to load model for key '{key}'")]
    ModelLoad {
        key: String,
        #[source]
        cause: ModelError,
    },

    /// A loaded model failed during inference.
    #[error("model inference failed")]
    Inference {
        #[source]
        cause: ModelError,
    },

    /// Speech synthesis exhausted its retry budget.
    ///
    /// Wraps the error from the final attempt; earlier failures are logged.
    #[error("speech synthesis failed after {attempts} attempts")]
    Synthesis {
        attempts: u32,
        #[source]
        cause: Box<ConvertError>,
    },

    // ── Ownership errors ──────────────────────────────────────────────────
    /// No conversion record exists with this id.
    #[error("conversion {id} not found")]
    NotFound { id: Uuid },

    /// The record exists but belongs to a different owner.
    #[error("conversion {id} does not belong to the caller")]
    Forbidden { id: Uuid },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A file or persistence operation failed.
    #[error("storage operation failed: {detail}")]
    Storage { detail: String },

    /// A requested byte range lies outside the artifact.
    #[error("requested byte range cannot be satisfied (artifact is {len} bytes)")]
    UnsatisfiableRange { len: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (panicked worker job, closed dispatcher).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable caller-facing classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input is wrong; retrying the same request cannot succeed.
    BadInput,
    /// A transient model or backend failure; retrying later may succeed.
    Retryable,
    /// The caller does not own the referenced record.
    Unauthorized,
    /// The referenced record does not exist.
    NotFound,
    /// A bug or environment problem on our side.
    Internal,
}

impl ConvertError {
    /// Map this error to its caller-facing category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::Validation { .. }
            | ConvertError::Extraction { .. }
            | ConvertError::NoTextFound
            | ConvertError::UnsatisfiableRange { .. } => ErrorCategory::BadInput,
            ConvertError::ModelLoad { .. }
            | ConvertError::Inference { .. }
            | ConvertError::Synthesis { .. } => ErrorCategory::Retryable,
            ConvertError::Forbidden { .. } => ErrorCategory::Unauthorized,
            ConvertError::NotFound { .. } => ErrorCategory::NotFound,
            ConvertError::Storage { .. }
            | ConvertError::InvalidConfig(_)
            | ConvertError::Internal(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_display_names_attempt_count() {
        let e = ConvertError::Synthesis {
            attempts: 5,
            cause: Box::new(ConvertError::Inference {
                cause: ModelError::new("vocoder crashed"),
            }),
        };
        assert!(e.to_string().contains("5 attempts"), "got: {e}");
    }

    #[test]
    fn synthesis_keeps_last_cause_in_chain() {
        use std::error::Error;
        let e = ConvertError::Synthesis {
            attempts: 3,
            cause: Box::new(ConvertError::Inference {
                cause: ModelError::new("vocoder crashed"),
            }),
        };
        let source = e.source().expect("synthesis must chain its cause");
        assert!(source.to_string().contains("inference"), "got: {source}");
    }

    #[test]
    fn categories_are_stable() {
        let id = Uuid::new_v4();
        assert_eq!(
            ConvertError::NoTextFound.category(),
            ErrorCategory::BadInput
        );
        assert_eq!(
            ConvertError::Forbidden { id }.category(),
            ErrorCategory::Unauthorized
        );
        assert_eq!(
            ConvertError::NotFound { id }.category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ConvertError::ModelLoad {
                key: "en".into(),
                cause: ModelError::new("weights missing"),
            }
            .category(),
            ErrorCategory::Retryable
        );
        assert_eq!(
            ConvertError::Storage {
                detail: "disk full".into()
            }
            .category(),
            ErrorCategory::Internal
        );
    }
}
