//! Conversion records and the persistence seam.
//!
//! The real schema and querying belong to an external collaborator; the
//! pipeline only needs the four operations in [`ConversionStore`].
//! [`MemoryStore`] is the in-process implementation used by tests and
//! embedders that do not need durability.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Where the narrated text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Image,
    Text,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A persisted conversion: one narrated document, image, or text input.
///
/// Invariant: at creation time `audio_file_path` points at an existing
/// artifact, and `text_content` carries the verbatim input for text sources
/// or the extracted text for pdf/image sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub id: Uuid,
    pub file_name: String,
    pub language: String,
    pub source_type: SourceKind,
    pub text_content: String,
    pub audio_file_path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Opaque authenticated owner id, supplied by the identity collaborator.
    pub user_id: Uuid,
}

/// Error surface owned by store implementations.
#[derive(Debug, Error)]
#[error("store operation failed: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Persistence operations the orchestrator needs.
#[async_trait]
pub trait ConversionStore: Send + Sync {
    /// Persist a new record.
    async fn create(&self, conversion: Conversion) -> Result<(), StoreError>;

    /// Fetch a record by id. `None` when no record exists.
    async fn get(&self, id: Uuid) -> Result<Option<Conversion>, StoreError>;

    /// List an owner's records in creation order, with offset pagination.
    async fn list_by_owner(
        &self,
        owner: Uuid,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Conversion>, StoreError>;

    /// Remove a record. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// In-memory store, insertion-ordered.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Conversion>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversionStore for MemoryStore {
    async fn create(&self, conversion: Conversion) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.iter().any(|c| c.id == conversion.id) {
            return Err(StoreError::new(format!(
                "duplicate conversion id {}",
                conversion.id
            )));
        }
        records.push(conversion);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversion>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner: Uuid,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Conversion>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|c| c.user_id == owner)
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|c| c.id != id);
        Ok(records.len() < before)
    }
}
