//! Audio artifact retrieval, whole or by byte range.
//!
//! Artifacts are plain WAV files on disk; embedders stream them out for
//! download or playback. Range support exists so seekable playback does not
//! force a full re-download, mirroring HTTP `Range` semantics: a single
//! `bytes=` range with first-byte, open-ended, and suffix forms.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tracing::debug;

use crate::error::ConvertError;

/// A stored audio artifact, opened for reading.
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
    len: u64,
}

/// A requested slice of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=a-` — from offset `a` to the end.
    From(u64),
    /// `bytes=a-b` — inclusive on both ends.
    Bounded(u64, u64),
    /// `bytes=-n` — the final `n` bytes.
    Suffix(u64),
}

/// One contiguous chunk read from an artifact.
#[derive(Debug)]
pub struct AudioChunk {
    pub bytes: Vec<u8>,
    /// Inclusive start offset of this chunk within the artifact.
    pub start: u64,
    /// Inclusive end offset of this chunk within the artifact.
    pub end: u64,
    /// Total artifact length.
    pub total: u64,
}

impl AudioArtifact {
    /// Open an artifact, verifying it exists and capturing its length.
    pub async fn open(path: &Path) -> Result<Self, ConvertError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: format!("audio artifact '{}' unavailable: {e}", path.display()),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MIME type of the artifact.
    pub fn content_type(&self) -> &'static str {
        "audio/wav"
    }

    /// `Content-Disposition` value for serving this artifact.
    pub fn content_disposition(&self, file_name: &str, inline: bool) -> String {
        let kind = if inline { "inline" } else { "attachment" };
        format!("{kind}; filename=\"{file_name}\"")
    }

    /// Read the whole artifact.
    pub async fn read_all(&self) -> Result<Vec<u8>, ConvertError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: format!("failed to read audio artifact: {e}"),
            })
    }

    /// Read one byte range of the artifact.
    ///
    /// Returns [`ConvertError::UnsatisfiableRange`] when the range lies
    /// entirely outside the artifact.
    pub async fn read_range(&self, range: ByteRange) -> Result<AudioChunk, ConvertError> {
        let (start, end) = range
            .resolve(self.len)
            .ok_or(ConvertError::UnsatisfiableRange { len: self.len })?;

        let mut file = File::open(&self.path)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: format!("failed to open audio artifact: {e}"),
            })?;
        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| ConvertError::Storage {
                detail: format!("failed to seek audio artifact: {e}"),
            })?;

        let mut bytes = vec![0u8; (end - start + 1) as usize];
        file.read_exact(&mut bytes)
            .await
            .map_err(|e| ConvertError::Storage {
                detail: format!("failed to read audio range: {e}"),
            })?;

        debug!("served range {start}-{end} of {} bytes", self.len);
        Ok(AudioChunk {
            bytes,
            start,
            end,
            total: self.len,
        })
    }
}

impl AudioChunk {
    /// `Content-Range` value for this chunk: `bytes start-end/total`.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

impl ByteRange {
    /// Parse an HTTP-style range header value.
    ///
    /// Exactly one range is accepted; multipart ranges return `None`.
    pub fn parse(header: &str) -> Option<ByteRange> {
        let spec = header.strip_prefix("bytes=")?.trim();
        if spec.contains(',') {
            return None;
        }
        let (start, end) = spec.split_once('-')?;
        match (start.is_empty(), end.is_empty()) {
            (true, false) => Some(ByteRange::Suffix(end.parse().ok()?)),
            (false, true) => Some(ByteRange::From(start.parse().ok()?)),
            (false, false) => {
                let (a, b) = (start.parse().ok()?, end.parse().ok()?);
                if a > b {
                    return None;
                }
                Some(ByteRange::Bounded(a, b))
            }
            (true, true) => None,
        }
    }

    /// Resolve to inclusive `(start, end)` offsets within `len` bytes.
    ///
    /// An end past the artifact is clamped; a start past it (or an empty
    /// suffix, or an empty artifact) is unsatisfiable and returns `None`.
    pub fn resolve(self, len: u64) -> Option<(u64, u64)> {
        if len == 0 {
            return None;
        }
        match self {
            ByteRange::From(start) => (start < len).then_some((start, len - 1)),
            ByteRange::Bounded(start, end) => {
                (start < len).then_some((start, end.min(len - 1)))
            }
            ByteRange::Suffix(n) => {
                if n == 0 {
                    return None;
                }
                Some((len.saturating_sub(n), len - 1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_range_forms() {
        assert_eq!(ByteRange::parse("bytes=0-99"), Some(ByteRange::Bounded(0, 99)));
        assert_eq!(ByteRange::parse("bytes=100-"), Some(ByteRange::From(100)));
        assert_eq!(ByteRange::parse("bytes=-50"), Some(ByteRange::Suffix(50)));
    }

    #[test]
    fn rejects_malformed_and_multipart_ranges() {
        assert_eq!(ByteRange::parse("bytes=0-99,200-"), None);
        assert_eq!(ByteRange::parse("bytes=-"), None);
        assert_eq!(ByteRange::parse("bytes=99-0"), None);
        assert_eq!(ByteRange::parse("0-99"), None);
        assert_eq!(ByteRange::parse("bytes=abc-def"), None);
    }

    #[test]
    fn resolve_clamps_and_rejects() {
        assert_eq!(ByteRange::Bounded(0, 9).resolve(100), Some((0, 9)));
        assert_eq!(ByteRange::Bounded(90, 500).resolve(100), Some((90, 99)));
        assert_eq!(ByteRange::From(100).resolve(100), None);
        assert_eq!(ByteRange::Suffix(10).resolve(100), Some((90, 99)));
        assert_eq!(ByteRange::Suffix(500).resolve(100), Some((0, 99)));
        assert_eq!(ByteRange::Suffix(0).resolve(100), None);
        assert_eq!(ByteRange::From(0).resolve(0), None);
    }

    #[tokio::test]
    async fn range_reads_return_the_exact_slice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        tokio::fs::write(&path, (0u8..100).collect::<Vec<_>>())
            .await
            .unwrap();

        let artifact = AudioArtifact::open(&path).await.unwrap();
        assert_eq!(artifact.len(), 100);

        let chunk = artifact
            .read_range(ByteRange::Bounded(10, 19))
            .await
            .unwrap();
        assert_eq!(chunk.bytes, (10u8..20).collect::<Vec<_>>());
        assert_eq!(chunk.content_range(), "bytes 10-19/100");

        let tail = artifact.read_range(ByteRange::Suffix(5)).await.unwrap();
        assert_eq!(tail.bytes, (95u8..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn out_of_bounds_range_is_unsatisfiable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        tokio::fs::write(&path, vec![0u8; 10]).await.unwrap();

        let artifact = AudioArtifact::open(&path).await.unwrap();
        let err = artifact.read_range(ByteRange::From(10)).await.unwrap_err();
        assert!(matches!(err, ConvertError::UnsatisfiableRange { len: 10 }));
    }

    #[tokio::test]
    async fn missing_artifact_is_a_storage_error() {
        let err = AudioArtifact::open(Path::new("/nonexistent/clip.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Storage { .. }));
    }
}
