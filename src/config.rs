//! Configuration for the conversion pipeline.
//!
//! All pipeline behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The retry knobs exist so tests can
//! exercise the synthesis retry loop without real ten-second waits.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConvertError;

/// Configuration for a [`crate::convert::ConversionService`].
///
/// # Example
/// ```rust
/// use doc2audio::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .audio_dir("audio_output")
///     .max_synthesis_retries(3)
///     .dispatcher_workers(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Directory where uploads are staged for the duration of one
    /// conversion. Created lazily. Default: `doc2audio_uploads` under the
    /// system temp dir.
    pub upload_dir: PathBuf,

    /// Directory where synthesized audio artifacts live. Created lazily on
    /// first synthesis. Default: `audio_output`.
    pub audio_dir: PathBuf,

    /// Maximum synthesis attempts before giving up. Default: 5.
    ///
    /// Model backends fail transiently (accelerator OOM, model download
    /// hiccups), so a single attempt would fail conversions that a retry
    /// would rescue.
    pub max_synthesis_retries: u32,

    /// Fixed delay between synthesis attempts. Default: 10 s.
    pub synthesis_retry_delay: Duration,

    /// Maximum concurrent blocking jobs (model loads, inference, staging
    /// I/O). Default: 4.
    pub dispatcher_workers: usize,

    /// Per-document page fan-out width during PDF extraction. Default: 8.
    ///
    /// Pages fan out concurrently but fan back in by page index, so this
    /// only affects throughput, never output order.
    pub page_concurrency: usize,

    /// Cap on the number of characters handed to the summarizer. Default:
    /// 50 000. Longer extracted text is truncated before summarization.
    pub max_summary_chars: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            upload_dir: std::env::temp_dir().join("doc2audio_uploads"),
            audio_dir: PathBuf::from("audio_output"),
            max_synthesis_retries: 5,
            synthesis_retry_delay: Duration::from_secs(10),
            dispatcher_workers: 4,
            page_concurrency: 8,
            max_summary_chars: 50_000,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.audio_dir = dir.into();
        self
    }

    pub fn max_synthesis_retries(mut self, n: u32) -> Self {
        self.config.max_synthesis_retries = n;
        self
    }

    pub fn synthesis_retry_delay(mut self, delay: Duration) -> Self {
        self.config.synthesis_retry_delay = delay;
        self
    }

    pub fn dispatcher_workers(mut self, n: usize) -> Self {
        self.config.dispatcher_workers = n.max(1);
        self
    }

    pub fn page_concurrency(mut self, n: usize) -> Self {
        self.config.page_concurrency = n.max(1);
        self
    }

    pub fn max_summary_chars(mut self, n: usize) -> Self {
        self.config.max_summary_chars = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.max_synthesis_retries == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_synthesis_retries must be ≥ 1".into(),
            ));
        }
        if c.dispatcher_workers == 0 {
            return Err(ConvertError::InvalidConfig(
                "dispatcher_workers must be ≥ 1".into(),
            ));
        }
        if c.page_concurrency == 0 {
            return Err(ConvertError::InvalidConfig(
                "page_concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
