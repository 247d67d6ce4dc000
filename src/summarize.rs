//! Summarization collaborator seam.
//!
//! Summarization is an external service (typically an LLM behind an API).
//! The orchestrator only needs the one call; implementations own their
//! transport, prompting, and credentials.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the summary should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    Brief,
    Detailed,
    BulletPoints,
}

impl std::fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brief => write!(f, "brief"),
            Self::Detailed => write!(f, "detailed"),
            Self::BulletPoints => write!(f, "bullet_points"),
        }
    }
}

/// Error surface owned by summarizer implementations.
#[derive(Debug, Error)]
#[error("summarization failed: {0}")]
pub struct SummarizeError(pub String);

impl SummarizeError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// A service that condenses extracted text before narration.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        text: &str,
        language: &str,
        style: SummaryStyle,
    ) -> Result<String, SummarizeError>;
}
