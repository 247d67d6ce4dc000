//! Inference seams: the traits a model backend must implement.
//!
//! Both traits are deliberately *blocking* — recognition and synthesis pin a
//! core (or an accelerator) for their whole duration, and every call is
//! routed through the [`crate::dispatch::Dispatcher`] rather than executed on
//! the async scheduler. Backends therefore never need to know about tokio.
//!
//! Methods take `&mut self` because typical engines carry internal scratch
//! state and are not reentrant; the [`crate::registry::ModelHandle`] wraps
//! each instance in a key-scoped lock so concurrent jobs serialize access
//! per model, never across models.

use std::path::Path;

use image::DynamicImage;

use crate::error::ModelError;

/// A loaded text-recognition model (OCR).
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in an image, returning fragments in detection order.
    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<String>, ModelError>;
}

/// A loaded speech-synthesis model (TTS).
pub trait SpeechModel: Send + Sync {
    /// Synthesize speech for `text`, optionally selecting a speaker for
    /// multi-speaker models.
    fn synthesize(&mut self, text: &str, speaker: Option<&str>) -> Result<SpeechAudio, ModelError>;
}

/// Raw synthesized audio: mono f32 samples plus their sample rate.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SpeechAudio {
    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}
